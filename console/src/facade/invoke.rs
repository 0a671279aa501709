//! Error-wrapping invocation of backend calls

use std::future::Future;

use tracing::{debug, error, warn};

use crate::backend::ConsoleBackend;
use crate::errors::{BackendError, ConsoleError};
use crate::facade::ConsoleFacade;
use crate::models::address::DeviceAddress;

impl ConsoleFacade {
    /// Run a blocking backend call, wrapping any failure with `context`.
    ///
    /// Guards must have passed before this is called.
    pub(crate) fn perform<T>(
        &self,
        address: &DeviceAddress,
        operation: &'static str,
        context: String,
        call: impl FnOnce(&dyn ConsoleBackend) -> Result<T, BackendError>,
    ) -> Result<T, ConsoleError> {
        debug!(console = %address, operation, "Invoking backend");
        call(self.backend.as_ref()).map_err(|source| wrap_failure(address, context, source))
    }
}

/// Await backend work, wrapping any failure with `context` when it completes
pub(crate) async fn perform_async<T, F>(
    address: &DeviceAddress,
    operation: &'static str,
    context: String,
    work: F,
) -> Result<T, ConsoleError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    debug!(console = %address, operation, "Invoking backend");
    work.await
        .map_err(|source| wrap_failure(address, context, source))
}

pub(crate) fn wrap_failure(
    address: &DeviceAddress,
    context: String,
    source: BackendError,
) -> ConsoleError {
    if source.is_not_supported() {
        warn!(console = %address, "{}: {}", context, source);
    } else {
        error!(console = %address, "{}: {}", context, source);
    }

    ConsoleError::OperationFailed {
        context,
        address: address.to_string(),
        source,
    }
}
