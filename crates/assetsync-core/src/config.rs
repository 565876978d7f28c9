use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::probe::ProbeStrategy;

/// HTTP client parameters (`[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    /// Connect timeout in seconds. None = wait indefinitely.
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds. None = wait indefinitely.
    pub timeout_secs: Option<u64>,
    /// Follow 3xx redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow.
    pub max_redirections: u32,
    /// Optional User-Agent override.
    pub user_agent: Option<String>,
    /// Extra request headers sent with every HEAD and GET.
    pub headers: HashMap<String, String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            timeout_secs: None,
            follow_redirects: true,
            max_redirections: 10,
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

/// Remote probe parameters (`[probe]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Order in which remote digest strategies are tried.
    pub strategies: Vec<ProbeStrategy>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            strategies: ProbeStrategy::DEFAULT_ORDER.to_vec(),
        }
    }
}

/// Configuration loaded from `~/.config/assetsync/config.toml` and handed to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub http: HttpOptions,
    #[serde(default)]
    pub probe: ProbeConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<SyncConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: SyncConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    if cfg.probe.strategies.is_empty() {
        anyhow::bail!("{}: probe.strategies must not be empty", path.display());
    }
    Ok(cfg)
}
