//! Tool configuration for mongoconf

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::auth::AgentDefaults;

/// Main mongoconf configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Defaults applied when bootstrapping agents
    pub agent: AgentConfig,
    /// How documents are written back
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, text)
    pub format: String,
}

/// Agent bootstrap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// POSIX keyfile path for the automation agent
    pub keyfile: String,
    /// Windows keyfile path for the automation agent
    pub keyfile_windows: String,
    /// Version written into backupVersions entries
    pub backup_version: String,
    /// Version written into monitoringVersions entries
    pub monitoring_version: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the JSON document
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        let defaults = AgentDefaults::default();
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
            agent: AgentConfig {
                keyfile: defaults.keyfile,
                keyfile_windows: defaults.keyfile_windows,
                backup_version: crate::agents::DEFAULT_BACKUP_VERSION.to_string(),
                monitoring_version: crate::agents::DEFAULT_MONITORING_VERSION.to_string(),
            },
            output: OutputConfig { pretty: true },
        }
    }
}

impl AgentConfig {
    /// Keyfile defaults for `enable_mechanism_with`
    pub fn defaults(&self) -> AgentDefaults {
        AgentDefaults {
            keyfile: self.keyfile.clone(),
            keyfile_windows: self.keyfile_windows.clone(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(ConfigError::ValidationError(
                format!("Invalid log level: {}", self.logging.level)
            )),
        }

        match self.logging.format.as_str() {
            "json" | "text" => {}
            _ => return Err(ConfigError::ValidationError(
                format!("Invalid log format: {}", self.logging.format)
            )),
        }

        let required = [
            ("keyfile", &self.agent.keyfile),
            ("keyfile_windows", &self.agent.keyfile_windows),
            ("backup_version", &self.agent.backup_version),
            ("monitoring_version", &self.agent.monitoring_version),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "agent.{} cannot be empty",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Create example configuration file
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        Config::default().save_to_file(path)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
