//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers only, capturing
//! `Content-MD5` and `ETag` so the remote digest can be learned without
//! transferring the body.

mod parse;

use std::str;

use crate::config::HttpOptions;
use crate::downloader::new_easy;
use crate::error::NetworkError;

/// Result of a successful HEAD request: headers that can identify the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// Raw `Content-MD5` value (base64 of the 16 digest bytes), if present.
    pub content_md5: Option<String>,
    /// `ETag` value with surrounding quotes stripped, if present.
    pub etag: Option<String>,
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects per `opts`; only the final response's headers are kept.
/// A non-2xx final status is an error. Runs in the current thread; call from
/// `spawn_blocking` if used from async code.
pub fn probe(url: &str, opts: &HttpOptions) -> Result<HeadResult, NetworkError> {
    let tr = |e| NetworkError::transport("HEAD", url, e);
    let mut headers: Vec<String> = Vec::new();

    let mut easy = new_easy(url, "HEAD", opts)?;
    easy.nobody(true).map_err(tr)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    // A new status line starts the headers of the next hop.
                    if s.starts_with("HTTP/") {
                        headers.clear();
                    }
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(tr)?;
        transfer.perform().map_err(tr)?;
    }

    let code = easy.response_code().map_err(tr)?;
    if !(200..300).contains(&code) {
        return Err(NetworkError::status("HEAD", url, code));
    }

    Ok(parse::parse_headers(&headers))
}
