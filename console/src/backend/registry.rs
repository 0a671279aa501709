//! Protocol version to backend resolution

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::unsupported::UnsupportedBackend;
use crate::backend::ConsoleBackend;

/// Registered backends, keyed by protocol version label
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn ConsoleBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `backend` under its own protocol version label
    pub fn register(&mut self, backend: Arc<dyn ConsoleBackend>) -> &mut Self {
        let version = backend.protocol_version().to_string();
        self.register_as(version, backend)
    }

    /// Register `backend` under an explicit label. Replaces any previous entry.
    pub fn register_as(
        &mut self,
        version: impl Into<String>,
        backend: Arc<dyn ConsoleBackend>,
    ) -> &mut Self {
        let version = version.into();
        debug!("Registering backend for protocol version {}", version);
        self.backends.insert(version, backend);
        self
    }

    pub fn get(&self, version: &str) -> Option<Arc<dyn ConsoleBackend>> {
        self.backends.get(version).cloned()
    }

    /// The backend for `version`, or the capability-less fallback
    pub fn resolve(&self, version: &str) -> Arc<dyn ConsoleBackend> {
        match self.get(version) {
            Some(backend) => backend,
            None => {
                warn!(
                    "No backend registered for protocol version {}, every operation will be unsupported",
                    version
                );
                Arc::new(UnsupportedBackend)
            }
        }
    }

    /// Registered protocol versions, sorted
    pub fn versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        versions.sort_unstable();
        versions
    }
}
