use std::path::{Path, PathBuf};

use eyre::{bail, Context, Result};
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use claimer_ethereum::{ClaimConfig, EthConfig};

/// Top level config layout. Never contains key material.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub eth: EthConfig,
    pub claim: ClaimConfig,
    pub log: LogConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Default tracing filter, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "~/.config/claimer/config.toml";

    /// Load the config, filling in missing values with defaults, and writing to disk after.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into().resolve().to_path_buf();
        debug!(config_path = ?path);

        // Read config or get the default
        let config = match std::fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)
                .with_context(|| format!("Failed to parse configuration at {path:?}"))?,
            Err(_) => Config::default(),
        };

        // Write config (with potentially new items)
        config.save(&path)?;

        Ok(config)
    }

    /// Persist the config, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let binding = path.as_ref();
        let path = binding.resolve();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    bail!("Failed to create configuration directory {parent:?}: {e}");
                }
            }
        }

        if let Err(e) = std::fs::write(&path, toml::to_string_pretty(self)?) {
            bail!("Failed to write configuration to {path:?}: {e}");
        }

        Ok(())
    }
}
