//! GET a resource and hash the body as it arrives, without keeping it.

use super::{check_status, new_easy};
use crate::checksum::{Digest, StreamHasher};
use crate::config::HttpOptions;
use crate::error::NetworkError;

/// Downloads the full body of `url` and returns its digest.
///
/// This transfers the entire resource purely to learn its digest; it is the
/// last resort for servers that expose neither `Content-MD5` nor a usable ETag.
/// Produces the same digest as `checksum::hash_bytes` over the buffered body.
pub fn digest_body(url: &str, opts: &HttpOptions) -> Result<Digest, NetworkError> {
    let tr = |e| NetworkError::transport("GET", url, e);
    let mut hasher = StreamHasher::new();

    let mut easy = new_easy(url, "GET", opts)?;
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                hasher.update(data);
                Ok(data.len())
            })
            .map_err(tr)?;
        transfer.perform().map_err(tr)?;
    }

    let code = easy.response_code().map_err(tr)?;
    check_status("GET", url, code)?;

    tracing::debug!("GET {} hashed {} body bytes", url, hasher.bytes());
    Ok(hasher.finish())
}
