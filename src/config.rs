//! Configuration for the Radio Signal Agent.

use crate::acquisition::PollTiming;
use crate::platform::PlatformTier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Delay before the first WiFi poll on polling tiers
    #[serde(with = "duration_millis")]
    pub poll_initial_delay: Duration,

    /// Interval between WiFi polls on polling tiers
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,

    /// Number of worker threads for callback-style queries
    pub worker_threads: usize,

    /// Force a platform tier instead of the one the source reports
    #[serde(default)]
    pub tier: Option<PlatformTier>,

    /// Serve readings from this JSON snapshot instead of the native platform
    #[serde(default)]
    pub replay_path: Option<PathBuf>,

    /// Highest WiFi signal level; defaults to what the platform reports
    #[serde(default)]
    pub max_wifi_level: Option<i32>,
}

impl Default for Config {
    fn default() -> Self {
        let timing = PollTiming::default();
        Self {
            poll_initial_delay: timing.initial_delay,
            poll_interval: timing.interval,
            worker_threads: 2,
            tier: None,
            replay_path: None,
            max_wifi_level: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does
    /// not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("radio-signal-agent")
            .join("config.json")
    }

    /// Poll cadence derived from this configuration.
    pub fn poll_timing(&self) -> PollTiming {
        PollTiming {
            initial_delay: self.poll_initial_delay,
            interval: self.poll_interval,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
