//! Logging configuration

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::ConsoleError;

/// Log level configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConsoleError::ConfigError(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging options
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Level used when `RUST_LOG` is not set
    pub log_level: LogLevel,

    /// Emit JSON lines instead of plain text
    pub json_format: bool,
}

/// Install the global tracing subscriber. Fails if one is already installed.
pub fn init_logging(options: &LogOptions) -> Result<(), ConsoleError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.log_level.as_filter()));

    let subscriber = tracing_subscriber::registry().with(filter);
    let installed = if options.json_format {
        subscriber.with(fmt::layer().json()).try_init()
    } else {
        subscriber.with(fmt::layer()).try_init()
    };

    installed.map_err(|e| ConsoleError::ConfigError(e.to_string()))
}
