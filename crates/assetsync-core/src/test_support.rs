//! In-memory `Transport` for unit tests.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::checksum::{hash_bytes, Digest};
use crate::error::{CacheError, NetworkError};
use crate::fetch_head::HeadResult;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub(crate) enum HeadReply {
    Ok(HeadResult),
    Status(u32),
    Refused,
}

/// Serves one body (or refuses connections) and counts calls.
pub(crate) struct FakeTransport {
    head: Mutex<HeadReply>,
    body: Mutex<Option<Vec<u8>>>,
    head_calls: AtomicUsize,
    get_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

fn refused(method: &'static str, url: &str) -> NetworkError {
    // CURLE_COULDNT_CONNECT
    NetworkError::transport(method, url, curl::Error::new(7))
}

impl FakeTransport {
    /// HEAD succeeds without digest headers; GET returns `body`.
    pub(crate) fn serving(body: &[u8]) -> Self {
        Self {
            head: Mutex::new(HeadReply::Ok(HeadResult::default())),
            body: Mutex::new(Some(body.to_vec())),
            head_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    /// Every request fails with connection refused.
    pub(crate) fn unreachable() -> Self {
        let t = Self::serving(b"");
        t.set_head(HeadReply::Refused);
        t.set_body(None);
        t
    }

    pub(crate) fn set_head(&self, reply: HeadReply) {
        *self.head.lock().unwrap() = reply;
    }

    pub(crate) fn set_body(&self, body: Option<&[u8]>) {
        *self.body.lock().unwrap() = body.map(<[u8]>::to_vec);
    }

    pub(crate) fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    /// GETs issued for validation (full-content probe tier).
    pub(crate) fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn head(&self, url: &str) -> Result<HeadResult, NetworkError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        match self.head.lock().unwrap().clone() {
            HeadReply::Ok(h) => Ok(h),
            HeadReply::Status(code) => Err(NetworkError::status("HEAD", url, code)),
            HeadReply::Refused => Err(refused("HEAD", url)),
        }
    }

    async fn digest_body(&self, url: &str) -> Result<Digest, NetworkError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        match self.body.lock().unwrap().as_deref() {
            Some(b) => Ok(hash_bytes(b)),
            None => Err(refused("GET", url)),
        }
    }

    async fn download(
        &self,
        url: &str,
        path: &Path,
        abort: Option<Arc<AtomicBool>>,
    ) -> Result<u64, CacheError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if abort.is_some_and(|a| a.load(Ordering::SeqCst)) {
            return Err(CacheError::Aborted);
        }
        let body = self.body.lock().unwrap().clone();
        match body {
            Some(b) => {
                std::fs::write(path, &b).map_err(|e| CacheError::io(path, e))?;
                Ok(b.len() as u64)
            }
            None => Err(refused("GET", url).into()),
        }
    }
}
