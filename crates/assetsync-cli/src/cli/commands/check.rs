//! `assetsync check` – print current, stale or unknown without touching the file.

use anyhow::Result;
use assetsync_core::config::SyncConfig;
use assetsync_core::{Orchestrator, Resource};

pub async fn run_check(cfg: &SyncConfig, resource: &Resource) -> Result<()> {
    let orchestrator = Orchestrator::new(cfg);
    let outcome = orchestrator
        .validator()
        .is_current(resource.local_path(), resource.url())
        .await;
    println!("{}", outcome);
    Ok(())
}
