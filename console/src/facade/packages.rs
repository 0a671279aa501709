//! Package management operations

use std::path::Path;

use crate::deploy::pipeline::{self, DeploymentHandle};
use crate::deploy::DeployOptions;
use crate::errors::ConsoleError;
use crate::facade::guard::{require_application, require_package};
use crate::facade::ConsoleFacade;
use crate::models::package::{ApplicationDescriptor, ExecutionState, PackageDescriptor};

impl ConsoleFacade {
    /// All packages installed on the console
    pub fn installed_packages(&self, address: &str) -> Result<Vec<PackageDescriptor>, ConsoleError> {
        let address = self.guard(address)?;
        self.perform(
            &address,
            "installed_packages",
            "Failed to retrieve installed packages".to_string(),
            |backend| backend.installed_packages(&address),
        )
    }

    pub fn set_debug_mode(
        &self,
        address: &str,
        package: &PackageDescriptor,
        enabled: bool,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "set_debug_mode",
            format!(
                "Failed to set debug mode ({}) for package: {}",
                enabled,
                package.full_name()
            ),
            |backend| backend.set_debug_mode(&address, package, enabled),
        )
    }

    pub fn launch_application(
        &self,
        address: &str,
        application: &ApplicationDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_application("application", application)?;
        self.perform(
            &address,
            "launch_application",
            format!("Failed to launch application with AUMID: {}", application.aumid()),
            |backend| backend.launch_application(&address, application),
        )
    }

    pub fn launch_application_with_arguments(
        &self,
        address: &str,
        application: &ApplicationDescriptor,
        arguments: &str,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_application("application", application)?;
        self.perform(
            &address,
            "launch_application_with_arguments",
            format!(
                "Failed to launch application with AUMID: {} and arguments: {}",
                application.aumid(),
                arguments
            ),
            |backend| backend.launch_application_with_arguments(&address, application, arguments),
        )
    }

    pub fn terminate_package(
        &self,
        address: &str,
        package: &PackageDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "terminate_package",
            format!("Failed to terminate package: {}", package.full_name()),
            |backend| backend.terminate_package(&address, package),
        )
    }

    pub fn suspend_package(
        &self,
        address: &str,
        package: &PackageDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "suspend_package",
            format!("Failed to suspend package: {}", package.full_name()),
            |backend| backend.suspend_package(&address, package),
        )
    }

    pub fn resume_package(
        &self,
        address: &str,
        package: &PackageDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "resume_package",
            format!("Failed to resume package: {}", package.full_name()),
            |backend| backend.resume_package(&address, package),
        )
    }

    pub fn constrain_package(
        &self,
        address: &str,
        package: &PackageDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "constrain_package",
            format!("Failed to constrain package: {}", package.full_name()),
            |backend| backend.constrain_package(&address, package),
        )
    }

    pub fn unconstrain_package(
        &self,
        address: &str,
        package: &PackageDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "unconstrain_package",
            format!("Failed to unconstrain package: {}", package.full_name()),
            |backend| backend.unconstrain_package(&address, package),
        )
    }

    pub fn snap_application(
        &self,
        address: &str,
        application: &ApplicationDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_application("application", application)?;
        self.perform(
            &address,
            "snap_application",
            format!("Failed to snap application with AUMID: {}", application.aumid()),
            |backend| backend.snap_application(&address, application),
        )
    }

    pub fn unsnap_application(&self, address: &str) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        self.perform(
            &address,
            "unsnap_application",
            "Failed to unsnap application".to_string(),
            |backend| backend.unsnap_application(&address),
        )
    }

    pub fn query_execution_state(
        &self,
        address: &str,
        package: &PackageDescriptor,
    ) -> Result<ExecutionState, ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "query_execution_state",
            format!(
                "Failed to query execution state of package: {}",
                package.full_name()
            ),
            |backend| backend.query_execution_state(&address, package),
        )
    }

    /// Push the file tree at `source` to the console.
    ///
    /// Guard failures are returned immediately. Everything else, including a
    /// missing capability, surfaces when the returned handle resolves. Must
    /// be called from within a Tokio runtime.
    pub fn deploy_push(
        &self,
        address: &str,
        source: impl AsRef<Path>,
        options: DeployOptions,
    ) -> Result<DeploymentHandle, ConsoleError> {
        let address = self.guard(address)?;
        pipeline::start(
            self.backend.clone(),
            address,
            source.as_ref().to_path_buf(),
            options,
        )
    }

    pub fn uninstall_package(
        &self,
        address: &str,
        package: &PackageDescriptor,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        require_package("package", package)?;
        self.perform(
            &address,
            "uninstall_package",
            format!(
                "Failed to uninstall package with full name '{}'",
                package.full_name()
            ),
            |backend| backend.uninstall_package(&address, package),
        )
    }

    /// Register the loose package at `package_path` on the console
    pub fn register_package(
        &self,
        address: &str,
        package_path: impl AsRef<Path>,
    ) -> Result<PackageDescriptor, ConsoleError> {
        let address = self.guard(address)?;
        let package_path = package_path.as_ref();
        self.perform(
            &address,
            "register_package",
            format!("Failed to register package from '{}'", package_path.display()),
            |backend| backend.register_package(&address, package_path),
        )
    }

    pub fn unregister_package(
        &self,
        address: &str,
        package_full_name: &str,
    ) -> Result<(), ConsoleError> {
        let address = self.guard(address)?;
        self.perform(
            &address,
            "unregister_package",
            format!("Failed to unregister package '{}'", package_full_name),
            |backend| backend.unregister_package(&address, package_full_name),
        )
    }

    /// Free bytes for app installation on `storage_name` (default storage when `None`)
    pub fn available_install_space(
        &self,
        address: &str,
        storage_name: Option<&str>,
    ) -> Result<u64, ConsoleError> {
        let address = self.guard(address)?;
        self.perform(
            &address,
            "available_install_space",
            format!(
                "Failed to get the space available for app installation on storage '{}'",
                storage_name.unwrap_or("default")
            ),
            |backend| backend.available_install_space(&address, storage_name),
        )
    }
}
