//! Per-path single flight and abort tokens.
//!
//! A cycle holds its path's lock from validation until the destination is
//! final, so two cycles never race to delete or write the same file. While a
//! cycle holds the lock its abort token is registered under the path; a
//! controller (e.g. a UI teardown) can call `request_abort` and the cycle stops
//! at its next suspension point.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
struct Registry {
    locks: HashMap<PathBuf, Arc<AsyncMutex<()>>>,
    tokens: HashMap<PathBuf, Arc<AtomicBool>>,
}

#[derive(Default, Clone)]
pub struct FlightRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until no other cycle holds `path`, then hold it. `abort` is the
    /// token published for `request_abort` while the guard lives.
    pub async fn acquire(&self, path: &Path, abort: Arc<AtomicBool>) -> FlightGuard {
        let key = flight_key(path);
        let lock = {
            let mut reg = self.registry();
            Arc::clone(reg.locks.entry(key.clone()).or_default())
        };
        let permit = lock.lock_owned().await;
        self.registry().tokens.insert(key.clone(), Arc::clone(&abort));
        FlightGuard {
            registry: self.clone(),
            path: key,
            permit: Some(permit),
        }
    }

    /// Ask the cycle currently holding `path` to stop. Returns false when none is running.
    pub fn request_abort(&self, path: &Path) -> bool {
        match self.registry().tokens.get(&flight_key(path)) {
            Some(token) => {
                token.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// True while some cycle holds `path`.
    pub fn is_active(&self, path: &Path) -> bool {
        self.registry().tokens.contains_key(&flight_key(path))
    }

    #[cfg(test)]
    fn tracked_paths(&self) -> usize {
        self.registry().locks.len()
    }
}

/// Registry key for `path`: absolute, with `.` components dropped, so
/// `205.mp4` and `./205.mp4` share one lock. Symlinks and `..` are not resolved.
fn flight_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Holds a path for one cycle. Dropping it unregisters the abort token and,
/// when no other cycle is waiting, forgets the path's lock.
pub struct FlightGuard {
    registry: FlightRegistry,
    path: PathBuf,
    permit: Option<OwnedMutexGuard<()>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut reg = self.registry.registry();
        reg.tokens.remove(&self.path);
        // Release before inspecting the count so only the map and waiters hold the lock.
        self.permit.take();
        let idle = reg
            .locks
            .get(&self.path)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            reg.locks.remove(&self.path);
        }
    }
}
