//! CLI for the assetsync cache validator.

mod commands;

use anyhow::Result;
use assetsync_core::config::{self, SyncConfig};
use assetsync_core::probe::ProbeStrategy;
use assetsync_core::Resource;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_check, run_hash, run_probe, run_sync};

/// Top-level CLI for assetsync.
#[derive(Debug, Parser)]
#[command(name = "assetsync")]
#[command(about = "assetsync: keep a local copy of a remote asset current", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the XDG default.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Validate the local copy and re-download it if needed; prints the served path.
    Sync {
        /// Direct HTTP/HTTPS URL of the asset.
        url: String,
        /// Local file. Defaults to the URL's file name in the current directory.
        path: Option<PathBuf>,
    },

    /// Report whether the local copy is current, stale or unknown. Changes nothing.
    Check {
        /// Direct HTTP/HTTPS URL of the asset.
        url: String,
        /// Local file. Defaults to the URL's file name in the current directory.
        path: Option<PathBuf>,
    },

    /// Print the remote digest and the strategy that produced it.
    Probe {
        /// Direct HTTP/HTTPS URL of the asset.
        url: String,
        /// Run only this strategy (content-md5, entity-tag, full-content).
        #[arg(long, value_name = "STRATEGY")]
        only: Option<ProbeStrategy>,
    },

    /// Print the MD5 digest of a local file.
    Hash {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync { url, path } => {
                let resource = resource_for(&url, path)?;
                run_sync(&cfg, &resource).await?;
            }
            CliCommand::Check { url, path } => {
                let resource = resource_for(&url, path)?;
                run_check(&cfg, &resource).await?;
            }
            CliCommand::Probe { url, only } => run_probe(&cfg, &url, only).await?,
            CliCommand::Hash { path } => run_hash(&path).await?,
        }

        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    match path {
        Some(p) => config::load_from(p),
        None => config::load_or_init(),
    }
}

fn resource_for(url: &str, path: Option<PathBuf>) -> Result<Resource> {
    let resource = match path {
        Some(p) => Resource::new(url, p)?,
        None => Resource::in_dir(url, &std::env::current_dir()?)?,
    };
    Ok(resource)
}

#[cfg(test)]
mod tests;
