//! Destination file lifecycle.
//!
//! Downloads land in a `.part` sibling of the destination and are renamed
//! into place only once complete, so the destination path never holds a
//! half-written body. Stale copies are deleted before a replacement begins.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `205.mp4` → `205.mp4.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// The destination's parent directory must already exist; it is never created here.
pub async fn ensure_parent_exists(final_path: &Path) -> Result<(), CacheError> {
    let parent = match final_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    match tokio::fs::metadata(parent).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(CacheError::io(
            parent,
            io::Error::other("parent is not a directory"),
        )),
        Err(e) => Err(CacheError::io(parent, e)),
    }
}

/// Best-effort removal of a stale cached file. Returns true if a file was removed.
/// Failures are logged and swallowed: the later rename overwrites the path anyway.
pub async fn remove_stale(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::info!("deleted stale cache file {}", path.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!("could not delete {} (continuing): {}", path.display(), e);
            false
        }
    }
}

/// Atomically rename the completed temp file onto the final path.
/// Fails if `final_path` is on a different filesystem.
pub async fn finalize(temp_path: &Path, final_path: &Path) -> Result<(), CacheError> {
    tokio::fs::rename(temp_path, final_path)
        .await
        .map_err(|e| CacheError::io(final_path, e))
}

/// Remove a temp file left by a failed or aborted download.
pub async fn discard(temp_path: &Path) {
    match tokio::fs::remove_file(temp_path).await {
        Ok(()) => tracing::debug!("removed partial download {}", temp_path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "could not remove partial download {}: {}",
            temp_path.display(),
            e
        ),
    }
}
