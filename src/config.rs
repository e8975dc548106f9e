//! Configuration for the `ferment` CLI.
//!
//! Read from `$FERMENT_CONFIG`, else `<config dir>/ferment/config.toml`.
//! A missing file means defaults. `$FERMENT_DATA_DIR` overrides `data_dir`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::constants::DEFAULT_RECENT_COMPLETIONS;

pub const CONFIG_ENV: &str = "FERMENT_CONFIG";
pub const DATA_DIR_ENV: &str = "FERMENT_DATA_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    /// How often `ferment watch` checks for due reminders
    pub poll_interval_secs: u64,
    /// Completed stages listed on the dashboard
    pub recent_completions: usize,
    pub log_format: LogFormat,
    /// Optional user recipe catalogue (TOML)
    pub recipes_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            poll_interval_secs: 30,
            recent_completions: DEFAULT_RECENT_COMPLETIONS,
            log_format: LogFormat::Text,
            recipes_file: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("ferment"))
        .unwrap_or_else(|| PathBuf::from(".ferment"))
}

/// Default config file location, if a config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ferment").join("config.toml"))
}

impl Config {
    /// Load from the environment-selected path and apply env overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be at least 1");
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn batches_dir(&self) -> PathBuf {
        self.data_dir.join("batches")
    }
}
