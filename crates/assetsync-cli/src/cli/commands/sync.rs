//! `assetsync sync` – run one validation/fetch cycle and print the served path.

use anyhow::Result;
use assetsync_core::config::SyncConfig;
use assetsync_core::{AssetConsumer, Orchestrator, Resource, ServeOrigin};
use std::path::Path;

/// Prints the completion signal of the cycle.
struct PrintConsumer;

impl AssetConsumer for PrintConsumer {
    fn ready(&self, path: &Path) {
        println!("{}", path.display());
    }

    fn failed(&self, reason: &str) {
        tracing::error!("sync failed: {}", reason);
    }
}

pub async fn run_sync(cfg: &SyncConfig, resource: &Resource) -> Result<()> {
    let orchestrator = Orchestrator::new(cfg);
    let served = orchestrator.deliver(resource, &PrintConsumer).await?;
    let origin = match served.origin {
        ServeOrigin::Cache => "cache",
        ServeOrigin::Download => "download",
    };
    eprintln!("served from {} (validation: {})", origin, served.outcome);
    Ok(())
}
