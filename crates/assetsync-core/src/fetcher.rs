//! Full download of a resource into its destination path.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::CacheError;
use crate::storage;
use crate::transport::Transport;

/// A completed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetched {
    pub bytes: u64,
}

pub type FetchResult = Result<Fetched, CacheError>;

/// Streams a resource to disk with a single attempt.
///
/// The body goes to `<dest>.part` and is renamed onto `dest` only after the
/// transfer succeeds and is synced. On failure the part file is removed and
/// `dest` is left untouched (absent, when the orchestrator deleted it first).
pub struct Fetcher {
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        abort: Option<Arc<AtomicBool>>,
    ) -> FetchResult {
        storage::ensure_parent_exists(dest).await?;

        let temp = storage::temp_path(dest);
        let result = match self.transport.download(url, &temp, abort).await {
            Ok(bytes) => storage::finalize(&temp, dest).await.map(|()| bytes),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                tracing::info!("downloaded {} ({} bytes) to {}", url, bytes, dest.display());
                Ok(Fetched { bytes })
            }
            Err(e) => {
                tracing::error!("download of {} failed: {}", url, e);
                storage::discard(&temp).await;
                Err(e)
            }
        }
    }
}
