//! Fallback backend with no capabilities

use crate::backend::ConsoleBackend;

/// Backend used when no strategy matches the console's protocol version.
/// Every operation fails with `FeatureNotSupported`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBackend;

impl ConsoleBackend for UnsupportedBackend {}
