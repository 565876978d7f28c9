//! The HTTP seam used by the probe and the fetcher.
//!
//! `CurlTransport` runs the blocking libcurl calls from `fetch_head` and
//! `downloader` on tokio's blocking pool. Tests substitute their own
//! `Transport` to exercise each probe tier and each orchestrator branch.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::checksum::Digest;
use crate::config::HttpOptions;
use crate::downloader;
use crate::error::{CacheError, NetworkError};
use crate::fetch_head::{self, HeadResult};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Metadata-only request. Errors on transport failure or non-2xx status.
    async fn head(&self, url: &str) -> Result<HeadResult, NetworkError>;

    /// Full GET whose body is hashed and discarded.
    async fn digest_body(&self, url: &str) -> Result<Digest, NetworkError>;

    /// Full GET streamed into `path`. Returns bytes written.
    async fn download(
        &self,
        url: &str,
        path: &Path,
        abort: Option<Arc<AtomicBool>>,
    ) -> Result<u64, CacheError>;
}

/// libcurl-backed transport.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    opts: Arc<HttpOptions>,
}

impl CurlTransport {
    pub fn new(opts: HttpOptions) -> Self {
        Self {
            opts: Arc::new(opts),
        }
    }
}

fn worker_failed(method: &'static str, url: &str, e: tokio::task::JoinError) -> NetworkError {
    NetworkError::Worker {
        method,
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl Transport for CurlTransport {
    async fn head(&self, url: &str) -> Result<HeadResult, NetworkError> {
        let opts = Arc::clone(&self.opts);
        let owned = url.to_string();
        tokio::task::spawn_blocking(move || fetch_head::probe(&owned, &opts))
            .await
            .map_err(|e| worker_failed("HEAD", url, e))?
    }

    async fn digest_body(&self, url: &str) -> Result<Digest, NetworkError> {
        let opts = Arc::clone(&self.opts);
        let owned = url.to_string();
        tokio::task::spawn_blocking(move || downloader::digest_body(&owned, &opts))
            .await
            .map_err(|e| worker_failed("GET", url, e))?
    }

    async fn download(
        &self,
        url: &str,
        path: &Path,
        abort: Option<Arc<AtomicBool>>,
    ) -> Result<u64, CacheError> {
        let opts = Arc::clone(&self.opts);
        let owned = url.to_string();
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            downloader::download_to_path(&owned, &opts, &path, abort.as_deref())
        })
        .await
        .map_err(|e| CacheError::from(worker_failed("GET", url, e)))?
    }
}
