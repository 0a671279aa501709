//! The console facade: one entry point per package lifecycle operation

pub mod guard;
pub mod invoke;
mod packages;

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::backend::{BackendRegistry, ConsoleBackend};
use crate::errors::ConsoleError;
use crate::facade::guard::Lifecycle;
use crate::models::address::DeviceAddress;
use crate::settings::Settings;

/// Uniform package lifecycle API over a pluggable backend.
///
/// Safe to share between threads. Calls for the same console are passed
/// straight to the backend without serialization.
pub struct ConsoleFacade {
    backend: Arc<dyn ConsoleBackend>,
    lifecycle: Lifecycle,
}

impl ConsoleFacade {
    pub fn new(backend: Arc<dyn ConsoleBackend>) -> Self {
        Self {
            backend,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Facade bound to the backend registered for the configured protocol version
    pub fn from_settings(settings: &Settings, registry: &BackendRegistry) -> Self {
        Self::new(registry.resolve(&settings.protocol_version))
    }

    /// The active backend strategy
    pub fn backend(&self) -> &Arc<dyn ConsoleBackend> {
        &self.backend
    }

    /// Tear the facade down. Every later call fails with `Disposed`.
    pub fn dispose(&self) {
        if self.lifecycle.dispose() {
            info!("Console facade disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    /// Lifecycle check, then address validation
    fn guard(&self, address: &str) -> Result<DeviceAddress, ConsoleError> {
        self.lifecycle.ensure_alive()?;
        DeviceAddress::parse(address)
    }
}

impl fmt::Debug for ConsoleFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleFacade")
            .field("backend", &self.backend.protocol_version())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
