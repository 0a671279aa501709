//! Error types for the console facade

use thiserror::Error;

/// Diagnostic carried by every capability a backend leaves unimplemented
pub const NOT_SUPPORTED_MESSAGE: &str =
    "This feature is not supported by the protocol version of the target console.";

/// Failures raised by a backend strategy while talking to a console
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Feature not supported: {0}")]
    FeatureNotSupported(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Acknowledgement of a cancellation request
    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackendError {
    /// The error every unimplemented capability returns
    pub fn not_supported() -> Self {
        BackendError::FeatureNotSupported(NOT_SUPPORTED_MESSAGE.to_string())
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, BackendError::FeatureNotSupported(_))
    }
}

/// Main error type for the console facade
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The facade was torn down; the instance is unusable.
    #[error("Console facade has been disposed")]
    Disposed,

    #[error("Invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    /// A backend call failed. `context` names the operation and its target.
    #[error("{context} (console: {address})")]
    OperationFailed {
        context: String,
        address: String,
        #[source]
        source: BackendError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    pub(crate) fn invalid_argument(param: &'static str, reason: impl Into<String>) -> Self {
        ConsoleError::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }

    /// The backend failure behind a wrapped operation error, if any
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            ConsoleError::OperationFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True when the active backend lacks the requested capability
    pub fn is_feature_not_supported(&self) -> bool {
        self.backend_error()
            .map(BackendError::is_not_supported)
            .unwrap_or(false)
    }
}
