//! One validation-then-fetch cycle per resource.
//!
//! ```text
//! Idle -> Validating -> {Serving, Deleting} -> Fetching -> Serving | Failed
//! ```
//!
//! Steps run strictly in order on one task: the probe finishes before any
//! fetch decision, and the delete finishes before the fetch starts. Only the
//! final result leaves the cycle; intermediate states are logged, not exposed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::CacheError;
use crate::fetcher::Fetcher;
use crate::flight::FlightRegistry;
use crate::probe::RemoteProbe;
use crate::resource::Resource;
use crate::storage;
use crate::transport::{CurlTransport, Transport};
use crate::validator::{CacheValidator, ValidationOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Idle,
    Validating,
    Deleting,
    Fetching,
    Serving,
    Failed,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where the served file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOrigin {
    /// The cached copy was validated as current and left untouched.
    Cache,
    /// The resource was (re)downloaded during this cycle.
    Download,
}

/// Successful end of a cycle: a local path reflecting the last validated content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub path: PathBuf,
    pub origin: ServeOrigin,
    /// What validation concluded before any fetch.
    pub outcome: ValidationOutcome,
}

/// Receives the single completion signal of a cycle.
pub trait AssetConsumer: Send + Sync {
    fn ready(&self, path: &Path);
    fn failed(&self, reason: &str);
}

pub struct Orchestrator {
    validator: CacheValidator,
    fetcher: Fetcher,
    flights: FlightRegistry,
}

impl Orchestrator {
    /// Build with libcurl transport configured from `config`.
    pub fn new(config: &SyncConfig) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(CurlTransport::new(config.http.clone()));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: &SyncConfig, transport: Arc<dyn Transport>) -> Self {
        let probe = RemoteProbe::new(Arc::clone(&transport), config.probe.strategies.clone());
        Self {
            validator: CacheValidator::new(probe),
            fetcher: Fetcher::new(transport),
            flights: FlightRegistry::new(),
        }
    }

    pub fn validator(&self) -> &CacheValidator {
        &self.validator
    }

    /// Registry of running cycles, for `request_abort` from outside.
    pub fn flights(&self) -> &FlightRegistry {
        &self.flights
    }

    pub async fn run(&self, resource: &Resource) -> Result<Served, CacheError> {
        self.run_with_abort(resource, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// Run a cycle that stops at its next suspension point once `abort` is set.
    pub async fn run_with_abort(
        &self,
        resource: &Resource,
        abort: Arc<AtomicBool>,
    ) -> Result<Served, CacheError> {
        let path = resource.local_path();
        let _flight = self.flights.acquire(path, Arc::clone(&abort)).await;

        let result = self.cycle(resource, &abort).await;
        match &result {
            Ok(served) => tracing::info!(
                "serving {} ({:?}, validation {})",
                served.path.display(),
                served.origin,
                served.outcome
            ),
            Err(e) => {
                transition(path, CycleState::Failed);
                tracing::error!("cycle for {} failed: {}", path.display(), e);
            }
        }
        result
    }

    /// Run a cycle and hand its result to `consumer`.
    pub async fn deliver(
        &self,
        resource: &Resource,
        consumer: &dyn AssetConsumer,
    ) -> Result<Served, CacheError> {
        let result = self.run(resource).await;
        match &result {
            Ok(served) => consumer.ready(&served.path),
            Err(e) => consumer.failed(&e.reason()),
        }
        result
    }

    async fn cycle(&self, resource: &Resource, abort: &Arc<AtomicBool>) -> Result<Served, CacheError> {
        let path = resource.local_path();
        let url = resource.url();
        transition(path, CycleState::Idle);

        check_abort(abort)?;
        transition(path, CycleState::Validating);
        let outcome = self.validator.is_current(path, url).await;

        if !outcome.needs_fetch() {
            transition(path, CycleState::Serving);
            return Ok(Served {
                path: path.to_path_buf(),
                origin: ServeOrigin::Cache,
                outcome,
            });
        }

        check_abort(abort)?;
        transition(path, CycleState::Deleting);
        storage::remove_stale(path).await;

        check_abort(abort)?;
        transition(path, CycleState::Fetching);
        self.fetcher.fetch(url, path, Some(Arc::clone(abort))).await?;

        transition(path, CycleState::Serving);
        Ok(Served {
            path: path.to_path_buf(),
            origin: ServeOrigin::Download,
            outcome,
        })
    }
}

fn transition(path: &Path, state: CycleState) {
    tracing::debug!("{}: {}", path.display(), state);
}

fn check_abort(abort: &AtomicBool) -> Result<(), CacheError> {
    if abort.load(Ordering::Relaxed) {
        Err(CacheError::Aborted)
    } else {
        Ok(())
    }
}
