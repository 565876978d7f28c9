//! Error taxonomy for validation and fetch cycles.

use std::io;
use std::path::PathBuf;

/// Transport or status failure of a single HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// libcurl reported an error (connect refused, DNS, timeout, reset...).
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: curl::Error,
    },
    /// The server answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u32,
    },
    /// The blocking worker running the request panicked or was cancelled.
    #[error("{method} {url} worker failed: {reason}")]
    Worker {
        method: &'static str,
        url: String,
        reason: String,
    },
}

impl NetworkError {
    pub(crate) fn transport(method: &'static str, url: &str, source: curl::Error) -> Self {
        NetworkError::Transport {
            method,
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn status(method: &'static str, url: &str, status: u32) -> Self {
        NetworkError::Status {
            method,
            url: url.to_string(),
            status,
        }
    }

    /// True when no connection could be made at all (refused, unresolved host).
    pub fn is_unreachable(&self) -> bool {
        match self {
            NetworkError::Transport { source, .. } => {
                source.is_couldnt_connect()
                    || source.is_couldnt_resolve_host()
                    || source.is_couldnt_resolve_proxy()
            }
            NetworkError::Status { .. } | NetworkError::Worker { .. } => false,
        }
    }
}

/// Failure of a cycle (or of one of its steps) as seen by the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("local I/O failed on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("hashing {} failed: {source}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("cycle aborted")]
    Aborted,
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }

    /// Human-readable reason handed to consumers on failure.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
