//! Single-stream HTTP GET written sequentially to a file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{check_status, new_easy};
use crate::config::HttpOptions;
use crate::error::{CacheError, NetworkError};

/// Downloads `url` with a single GET, writing the body to `path` (created or truncated).
/// Returns the number of bytes written. The file is synced before returning Ok.
///
/// When `abort` is set during the transfer the write callback stops curl and the
/// result is `CacheError::Aborted`. On any error the file at `path` may hold a
/// partial body; the caller owns its cleanup.
pub fn download_to_path(
    url: &str,
    opts: &HttpOptions,
    path: &Path,
    abort: Option<&AtomicBool>,
) -> Result<u64, CacheError> {
    let tr = |e| NetworkError::transport("GET", url, e);

    let mut file = File::create(path).map_err(|e| CacheError::io(path, e))?;
    let mut written = 0u64;
    let mut write_err: Option<io::Error> = None;
    let mut aborted = false;

    let mut easy = new_easy(url, "GET", opts)?;
    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if abort.is_some_and(|a| a.load(Ordering::Relaxed)) {
                    aborted = true;
                    return Ok(0); // abort transfer
                }
                match file.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        tracing::warn!("download write to {} failed: {}", path.display(), e);
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })
            .map_err(tr)?;
        transfer.perform()
    };

    if aborted {
        return Err(CacheError::Aborted);
    }
    if let Some(e) = write_err {
        return Err(CacheError::io(path, e));
    }
    performed.map_err(tr)?;

    let code = easy.response_code().map_err(tr)?;
    check_status("GET", url, code)?;

    file.sync_all().map_err(|e| CacheError::io(path, e))?;
    tracing::debug!("GET {} wrote {} bytes to {}", url, written, path.display());
    Ok(written)
}
