//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::{config_path, CONFIG_ENV};
use super::{Error, Result};

/// Default number of events kept for failure context
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Session defaults
    #[serde(default)]
    pub session: SessionConfig,
}

/// Settings applied to every session built from configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Append the recent I/O history to content mismatches
    #[serde(default = "default_verbose_errors")]
    pub verbose_errors: bool,

    /// Number of channel events kept for diagnostics
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Trace every served input character and completed output line
    #[serde(default)]
    pub write_log: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verbose_errors: default_verbose_errors(),
            history_capacity: default_history_capacity(),
            write_log: false,
        }
    }
}

fn default_verbose_errors() -> bool {
    true
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist. A path named by
    /// `$STDIO_SCRIPT_CONFIG` must exist.
    pub fn load() -> Result<Self> {
        let forced = std::env::var_os(CONFIG_ENV).is_some_and(|v| !v.is_empty());
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) if forced => Err(Error::Config(format!(
                "{} points to {}, which does not exist",
                CONFIG_ENV,
                path.display()
            ))),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        if config.session.history_capacity == 0 {
            tracing::warn!("history_capacity = 0 disables failure context");
        }
        Ok(config)
    }
}
