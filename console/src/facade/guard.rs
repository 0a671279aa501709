//! Preconditions checked before any backend call

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::ConsoleError;
use crate::models::package::{ApplicationDescriptor, PackageDescriptor};

/// One-way disposed flag
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    disposed: AtomicBool,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ensure_alive(&self) -> Result<(), ConsoleError> {
        if self.is_disposed() {
            Err(ConsoleError::Disposed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Returns true for the call that performed the transition
    pub(crate) fn dispose(&self) -> bool {
        self.disposed
            .compare_exchange(false, true, Ordering::Release, Ordering::Relaxed)
            .is_ok()
    }
}

/// A package argument must carry a full name
pub fn require_package(
    param: &'static str,
    package: &PackageDescriptor,
) -> Result<(), ConsoleError> {
    if package.full_name().trim().is_empty() {
        return Err(ConsoleError::invalid_argument(param, "package has no full name"));
    }
    Ok(())
}

/// An application argument must carry an AUMID
pub fn require_application(
    param: &'static str,
    application: &ApplicationDescriptor,
) -> Result<(), ConsoleError> {
    if application.aumid().trim().is_empty() {
        return Err(ConsoleError::invalid_argument(param, "application has no AUMID"));
    }
    Ok(())
}
