//! Blocking libcurl transfers: streaming GET into a file or into a hasher.
//!
//! Both transfers stream the body through curl's write callback, so memory
//! use is bounded by curl's receive buffer regardless of the asset size.
//! Everything here blocks; the async `Transport` runs it on tokio's blocking pool.

mod body_digest;
mod single;

use curl::easy::{Easy, List};
use std::time::Duration;

use crate::config::HttpOptions;
use crate::error::NetworkError;

pub use body_digest::digest_body;
pub use single::download_to_path;

/// Creates a curl handle for `url` with the shared client options applied.
pub(crate) fn new_easy(
    url: &str,
    method: &'static str,
    opts: &HttpOptions,
) -> Result<Easy, NetworkError> {
    let tr = |e| NetworkError::transport(method, url, e);

    let mut easy = Easy::new();
    easy.url(url).map_err(tr)?;
    easy.follow_location(opts.follow_redirects).map_err(tr)?;
    easy.max_redirections(opts.max_redirections).map_err(tr)?;
    if let Some(secs) = opts.connect_timeout_secs {
        easy.connect_timeout(Duration::from_secs(secs)).map_err(tr)?;
    }
    if let Some(secs) = opts.timeout_secs {
        easy.timeout(Duration::from_secs(secs)).map_err(tr)?;
    }
    if let Some(ua) = &opts.user_agent {
        easy.useragent(ua).map_err(tr)?;
    }

    let mut list = List::new();
    for (k, v) in &opts.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))
            .map_err(tr)?;
    }
    if !opts.headers.is_empty() {
        easy.http_headers(list).map_err(tr)?;
    }

    Ok(easy)
}

/// Maps a final response code to an error unless it is 2xx.
pub(crate) fn check_status(method: &'static str, url: &str, code: u32) -> Result<(), NetworkError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(NetworkError::status(method, url, code))
    }
}
