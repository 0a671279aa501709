//! Backend strategies: the per-protocol-version implementations that talk
//! to a console.

pub mod registry;
pub mod simulated;
pub mod unsupported;

use std::path::Path;

use async_trait::async_trait;

use crate::deploy::cancel::CancelSignal;
use crate::deploy::progress::ProgressReporter;
use crate::errors::BackendError;
use crate::models::address::DeviceAddress;
use crate::models::package::{ApplicationDescriptor, ExecutionState, PackageDescriptor};

pub use registry::BackendRegistry;
pub use simulated::SimulatedConsole;
pub use unsupported::UnsupportedBackend;

/// Capability interface of a console backend.
///
/// Every operation has a default that fails with
/// [`BackendError::FeatureNotSupported`], so a backend for a given protocol
/// version overrides only what that version can do.
#[async_trait]
pub trait ConsoleBackend: Send + Sync {
    /// Label of the protocol version this backend speaks
    fn protocol_version(&self) -> &str {
        "unsupported"
    }

    fn installed_packages(
        &self,
        _address: &DeviceAddress,
    ) -> Result<Vec<PackageDescriptor>, BackendError> {
        Err(BackendError::not_supported())
    }

    fn set_debug_mode(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
        _enabled: bool,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn launch_application(
        &self,
        _address: &DeviceAddress,
        _application: &ApplicationDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    /// Launch with an argument string. Independent of `launch_application`.
    fn launch_application_with_arguments(
        &self,
        _address: &DeviceAddress,
        _application: &ApplicationDescriptor,
        _arguments: &str,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn terminate_package(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn suspend_package(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn resume_package(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn constrain_package(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn unconstrain_package(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn snap_application(
        &self,
        _address: &DeviceAddress,
        _application: &ApplicationDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn unsnap_application(&self, _address: &DeviceAddress) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn query_execution_state(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
    ) -> Result<ExecutionState, BackendError> {
        Err(BackendError::not_supported())
    }

    /// Push the tree at `source` to the console and register it.
    ///
    /// Progress goes through `progress`. When `cancel` fires, stop and return
    /// [`BackendError::Cancelled`] once the console side is consistent.
    async fn deploy_push(
        &self,
        _address: &DeviceAddress,
        _source: &Path,
        _remove_extra_files: bool,
        _cancel: &CancelSignal,
        _progress: &ProgressReporter,
    ) -> Result<PackageDescriptor, BackendError> {
        Err(BackendError::not_supported())
    }

    fn uninstall_package(
        &self,
        _address: &DeviceAddress,
        _package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    fn register_package(
        &self,
        _address: &DeviceAddress,
        _package_path: &Path,
    ) -> Result<PackageDescriptor, BackendError> {
        Err(BackendError::not_supported())
    }

    fn unregister_package(
        &self,
        _address: &DeviceAddress,
        _package_full_name: &str,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported())
    }

    /// Free bytes for app installation; `None` selects the default storage.
    fn available_install_space(
        &self,
        _address: &DeviceAddress,
        _storage_name: Option<&str>,
    ) -> Result<u64, BackendError> {
        Err(BackendError::not_supported())
    }
}
