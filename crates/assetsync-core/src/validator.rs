//! Decide whether a cached file still matches the remote resource.

use std::fmt;
use std::path::Path;

use crate::checksum;
use crate::probe::RemoteProbe;

/// Result of comparing a local file with its remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Local digest equals the remote digest.
    Current,
    /// Digests differ, or there is no local file.
    Stale,
    /// The comparison could not be made (remote digest or local hash unavailable).
    Unknown,
}

impl ValidationOutcome {
    /// Whether the cached file must be replaced. Unknown counts as stale.
    pub fn needs_fetch(self) -> bool {
        !matches!(self, ValidationOutcome::Current)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationOutcome::Current => "current",
            ValidationOutcome::Stale => "stale",
            ValidationOutcome::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Compares the local digest with the remote one. Never writes to disk or
/// mutates the remote; the only side effects are reads and requests.
pub struct CacheValidator {
    probe: RemoteProbe,
}

impl CacheValidator {
    pub fn new(probe: RemoteProbe) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &RemoteProbe {
        &self.probe
    }

    pub async fn is_current(&self, local_path: &Path, url: &str) -> ValidationOutcome {
        if matches!(tokio::fs::try_exists(local_path).await, Ok(false)) {
            tracing::debug!("{} not cached", local_path.display());
            return ValidationOutcome::Stale;
        }

        let local = match checksum::hash_path(local_path).await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("cannot hash cached file, treating as unknown: {}", e);
                return ValidationOutcome::Unknown;
            }
        };

        let Some(remote) = self.probe.probe(url).await else {
            return ValidationOutcome::Unknown;
        };

        // Digest equality is byte equality, so hex case never matters.
        let outcome = if local == remote.digest {
            ValidationOutcome::Current
        } else {
            ValidationOutcome::Stale
        };
        tracing::info!(
            "{}: local {} vs remote {} ({}) -> {}",
            local_path.display(),
            local,
            remote.digest,
            remote.strategy,
            outcome
        );
        outcome
    }
}
