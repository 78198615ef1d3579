use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "veil.toml";

/// Settings read from `veil.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// JSON file backing the persisted store. Without one, state lives only for the run.
    pub storage_path: Option<PathBuf>,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// `tracing_subscriber::EnvFilter` directives. `VEIL_LOG` wins over this.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: None,
            retry_attempts: popup::client::DEFAULT_MAX_RETRIES,
            retry_delay_ms: popup::client::DEFAULT_RETRY_DELAY.as_millis() as u64,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load an explicit config file, or `veil.toml` from the working directory when it
    /// exists, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.exists() {
                    return Ok(Self::default());
                }
                local
            }
        };
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }
}
