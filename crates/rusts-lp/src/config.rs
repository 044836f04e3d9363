//! Configuration for rusts-lp, loaded from YAML

use anyhow::Context;
use rusts_core::WritePrecision;
use rusts_line_protocol::WriteOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;

/// Complete tool configuration - can be loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpConfig {
    /// Output encoding and batching
    pub write: WriteOptions,
    /// How input lines are read
    pub input: InputSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Input settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Precision of timestamps in the input
    pub precision: WritePrecision,
    /// Drop unparseable lines instead of failing
    pub skip_invalid: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            precision: WritePrecision::Nanosecond,
            skip_invalid: false,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Show module targets
    pub show_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
        }
    }
}

impl LpConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: LpConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default config to a file (for generating example config)
    pub fn write_default(path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(&Self::default())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Get log level
    pub fn log_level(&self) -> Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}
