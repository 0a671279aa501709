//! Facade settings

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::SimulatedConsole;
use crate::errors::ConsoleError;
use crate::logs::{LogLevel, LogOptions};
use crate::models::address::DeviceAddress;

/// Facade settings, read from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    /// Protocol version of the target consoles; selects the backend
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,

    /// Console used when a caller does not name one
    #[serde(default)]
    pub default_console: Option<String>,

    /// Push deployment defaults
    #[serde(default)]
    pub deploy: DeploySettings,
}

fn default_protocol_version() -> String {
    SimulatedConsole::PROTOCOL_VERSION.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            protocol_version: default_protocol_version(),
            default_console: None,
            deploy: DeploySettings::default(),
        }
    }
}

impl Settings {
    /// Read and validate a settings file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());

        let contents = tokio::fs::read_to_string(path).await?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.protocol_version.trim().is_empty() {
            return Err(ConsoleError::ConfigError(
                "protocol_version must not be empty".to_string(),
            ));
        }

        if let Some(console) = &self.default_console {
            DeviceAddress::parse(console)
                .map_err(|e| ConsoleError::ConfigError(format!("default_console: {}", e)))?;
        }

        Ok(())
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_level: self.log_level,
            json_format: self.json_logs,
        }
    }
}

/// Push deployment settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploySettings {
    /// Delete console files missing from the source tree
    #[serde(default)]
    pub remove_extra_files: bool,
}
