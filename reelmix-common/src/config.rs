//! Configuration loading
//!
//! A missing config file or missing keys never terminate the service:
//! every field has a compiled default and loading degrades gracefully with
//! a logged warning.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Engine tuning parameters
///
/// All time-sensitive constants of the core live here so tests can shrink
/// them and deployments can tune them without rebuilding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Keyword index cache lifetime in seconds
    pub index_ttl_secs: u64,
    /// Playback position poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Grace delay before a skip resolves, in milliseconds
    pub grace_delay_ms: u64,
    /// How long to wait for the widget's ready signal before skipping
    pub ready_timeout_secs: u64,
    /// End-of-clip detection tolerance in seconds
    pub end_epsilon_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_ttl_secs: 300,
            poll_interval_ms: 250,
            grace_delay_ms: 500,
            ready_timeout_secs: 10,
            end_epsilon_secs: 0.5,
        }
    }
}

impl EngineConfig {
    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

/// Top-level TOML configuration for the player service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database path holding interviews and segments
    pub database_path: String,
    pub engine: EngineConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: 5745,
            database_path: "reelmix.db".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields compiled defaults with a warning. A file that
    /// exists but fails to parse is a hard error: silently ignoring a
    /// present-but-broken config hides operator mistakes.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&contents)
            .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }
}
