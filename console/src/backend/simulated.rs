//! In-memory console backend.
//!
//! Implements every capability against simulated consoles held in memory.
//! Push deployments read the real source tree from the local file system.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::backend::ConsoleBackend;
use crate::deploy::cancel::CancelSignal;
use crate::deploy::progress::ProgressReporter;
use crate::errors::BackendError;
use crate::models::address::DeviceAddress;
use crate::models::deployment::{DeploymentError, DeploymentExtraFile, DeploymentMetric};
use crate::models::package::{ApplicationDescriptor, ExecutionState, PackageDescriptor};

/// Storage used when the caller names none
pub const DEFAULT_STORAGE: &str = "internal";

/// Capacity of a freshly provisioned storage (500 GiB)
pub const DEFAULT_CAPACITY: u64 = 500 * 1024 * 1024 * 1024;

/// A fleet of simulated consoles, keyed by address
#[derive(Debug, Default)]
pub struct SimulatedConsole {
    consoles: Mutex<HashMap<String, ConsoleState>>,
}

#[derive(Debug)]
struct ConsoleState {
    packages: BTreeMap<String, InstalledPackage>,
    snapped: Option<String>,
    storages: BTreeMap<String, u64>,
}

impl ConsoleState {
    fn new() -> Self {
        Self {
            packages: BTreeMap::new(),
            snapped: None,
            storages: BTreeMap::from([(DEFAULT_STORAGE.to_string(), DEFAULT_CAPACITY)]),
        }
    }

    fn package_mut(&mut self, full_name: &str) -> Result<&mut InstalledPackage, BackendError> {
        self.packages
            .get_mut(full_name)
            .ok_or_else(|| BackendError::NotFound(format!("package {}", full_name)))
    }

    fn application_package_mut(
        &mut self,
        application: &ApplicationDescriptor,
    ) -> Result<&mut InstalledPackage, BackendError> {
        let installed = self.package_mut(application.package().full_name())?;
        if installed
            .descriptor
            .applications()
            .any(|app| app.aumid() == application.aumid())
        {
            Ok(installed)
        } else {
            Err(BackendError::NotFound(format!(
                "application {}",
                application.aumid()
            )))
        }
    }

    fn used_bytes(&self, storage: &str) -> u64 {
        self.packages
            .values()
            .filter(|p| p.storage == storage)
            .map(InstalledPackage::size)
            .sum()
    }
}

#[derive(Debug)]
struct InstalledPackage {
    descriptor: PackageDescriptor,
    state: ExecutionState,
    debug_mode: bool,
    launch_arguments: Option<String>,
    storage: String,
    files: BTreeMap<PathBuf, u64>,
}

impl InstalledPackage {
    fn new(descriptor: PackageDescriptor) -> Self {
        Self {
            descriptor,
            state: ExecutionState::Terminated,
            debug_mode: false,
            launch_arguments: None,
            storage: DEFAULT_STORAGE.to_string(),
            files: BTreeMap::new(),
        }
    }

    fn size(&self) -> u64 {
        self.files.values().sum()
    }
}

impl SimulatedConsole {
    pub const PROTOCOL_VERSION: &'static str = "simulated";

    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a console reachable at `address`
    pub fn with_console(self, address: &str) -> Self {
        self.lock()
            .entry(address.to_string())
            .or_insert_with(ConsoleState::new);
        self
    }

    /// Provision (or resize) a named storage on a console
    pub fn with_storage(self, address: &str, name: &str, capacity: u64) -> Self {
        self.lock()
            .entry(address.to_string())
            .or_insert_with(ConsoleState::new)
            .storages
            .insert(name.to_string(), capacity);
        self
    }

    /// Files of an installed package, relative to its root
    pub fn package_files(&self, address: &str, full_name: &str) -> Option<Vec<PathBuf>> {
        self.lock()
            .get(address)?
            .packages
            .get(full_name)
            .map(|p| p.files.keys().cloned().collect())
    }

    pub fn debug_mode(&self, address: &str, full_name: &str) -> Option<bool> {
        self.lock()
            .get(address)?
            .packages
            .get(full_name)
            .map(|p| p.debug_mode)
    }

    /// Arguments of the most recent launch of any application in the package
    pub fn launch_arguments(&self, address: &str, full_name: &str) -> Option<String> {
        self.lock()
            .get(address)?
            .packages
            .get(full_name)?
            .launch_arguments
            .clone()
    }

    pub fn snapped_application(&self, address: &str) -> Option<String> {
        self.lock().get(address)?.snapped.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ConsoleState>> {
        self.consoles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_state<R>(
        &self,
        address: &DeviceAddress,
        f: impl FnOnce(&mut ConsoleState) -> Result<R, BackendError>,
    ) -> Result<R, BackendError> {
        let mut consoles = self.lock();
        let state = consoles.get_mut(address.as_str()).ok_or_else(|| {
            BackendError::Transport(format!("console {} is not reachable", address))
        })?;
        f(state)
    }

    fn set_state(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
        state: ExecutionState,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            console.package_mut(package.full_name())?.state = state;
            debug!("{} is now {} on {}", package, state, address);
            Ok(())
        })
    }
}

#[async_trait]
impl ConsoleBackend for SimulatedConsole {
    fn protocol_version(&self) -> &str {
        Self::PROTOCOL_VERSION
    }

    fn installed_packages(
        &self,
        address: &DeviceAddress,
    ) -> Result<Vec<PackageDescriptor>, BackendError> {
        self.with_state(address, |console| {
            Ok(console
                .packages
                .values()
                .map(|p| p.descriptor.clone())
                .collect())
        })
    }

    fn set_debug_mode(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
        enabled: bool,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            console.package_mut(package.full_name())?.debug_mode = enabled;
            Ok(())
        })
    }

    fn launch_application(
        &self,
        address: &DeviceAddress,
        application: &ApplicationDescriptor,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            let installed = console.application_package_mut(application)?;
            installed.state = ExecutionState::Running;
            installed.launch_arguments = None;
            Ok(())
        })
    }

    fn launch_application_with_arguments(
        &self,
        address: &DeviceAddress,
        application: &ApplicationDescriptor,
        arguments: &str,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            let installed = console.application_package_mut(application)?;
            installed.state = ExecutionState::Running;
            installed.launch_arguments = Some(arguments.to_string());
            Ok(())
        })
    }

    fn terminate_package(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            let installed = console.package_mut(package.full_name())?;
            installed.state = ExecutionState::Terminated;
            let owned: Vec<String> = installed
                .descriptor
                .applications()
                .map(|app| app.aumid().to_string())
                .collect();

            if console
                .snapped
                .as_ref()
                .is_some_and(|aumid| owned.contains(aumid))
            {
                console.snapped = None;
            }
            Ok(())
        })
    }

    fn suspend_package(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        self.set_state(address, package, ExecutionState::Suspended)
    }

    fn resume_package(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        self.set_state(address, package, ExecutionState::Running)
    }

    fn constrain_package(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        self.set_state(address, package, ExecutionState::Constrained)
    }

    fn unconstrain_package(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        self.set_state(address, package, ExecutionState::Running)
    }

    fn snap_application(
        &self,
        address: &DeviceAddress,
        application: &ApplicationDescriptor,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            console.application_package_mut(application)?;
            console.snapped = Some(application.aumid().to_string());
            Ok(())
        })
    }

    fn unsnap_application(&self, address: &DeviceAddress) -> Result<(), BackendError> {
        self.with_state(address, |console| match console.snapped.take() {
            Some(_) => Ok(()),
            None => Err(BackendError::Device("no application is snapped".to_string())),
        })
    }

    fn query_execution_state(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
    ) -> Result<ExecutionState, BackendError> {
        self.with_state(address, |console| {
            Ok(console.package_mut(package.full_name())?.state)
        })
    }

    async fn deploy_push(
        &self,
        address: &DeviceAddress,
        source: &Path,
        remove_extra_files: bool,
        cancel: &CancelSignal,
        progress: &ProgressReporter,
    ) -> Result<PackageDescriptor, BackendError> {
        // Unreachable consoles fail before any file is read
        self.with_state(address, |_| Ok(()))?;

        let metadata = fs::metadata(source).await?;
        if !metadata.is_dir() {
            return Err(BackendError::Device(format!(
                "deployment source {} is not a directory",
                source.display()
            )));
        }

        let descriptor = descriptor_for(source)?;
        let files = scan_tree(source, progress).await?;
        let existing = self.with_state(address, |console| {
            Ok(console
                .packages
                .get(descriptor.full_name())
                .map(|p| p.files.clone())
                .unwrap_or_default())
        })?;

        let mut metric = DeploymentMetric {
            total_files: files.len() as u64,
            total_bytes: files.iter().map(|(_, size)| size).sum(),
            ..Default::default()
        };
        progress.metric(metric.clone());

        let mut deployed = BTreeMap::new();
        for (path, size) in files {
            if cancel.is_cancelled() {
                debug!("Push of {} cancelled before {}", descriptor, path.display());
                return Err(BackendError::Cancelled);
            }

            if existing.get(&path) == Some(&size) {
                metric.skipped_files += 1;
                metric.skipped_bytes += size;
            } else {
                metric.transferred_files += 1;
                metric.transferred_bytes += size;
            }
            deployed.insert(path, size);
            progress.metric(metric.clone());
            tokio::task::yield_now().await;
        }

        for (path, size) in &existing {
            if deployed.contains_key(path) {
                continue;
            }
            progress.extra_file(DeploymentExtraFile {
                file_path: path.clone(),
            });
            if !remove_extra_files {
                deployed.insert(path.clone(), *size);
            }
        }

        self.with_state(address, |console| {
            let needed: u64 = deployed.values().sum();
            let current = console
                .packages
                .get(descriptor.full_name())
                .filter(|p| p.storage == DEFAULT_STORAGE)
                .map(InstalledPackage::size)
                .unwrap_or(0);
            let capacity = console.storages.get(DEFAULT_STORAGE).copied().unwrap_or(0);
            let available = capacity.saturating_sub(console.used_bytes(DEFAULT_STORAGE) - current);
            if needed > available {
                return Err(BackendError::Device(format!(
                    "not enough space on {}: {} bytes needed, {} available",
                    DEFAULT_STORAGE, needed, available
                )));
            }

            let installed = console
                .packages
                .entry(descriptor.full_name().to_string())
                .or_insert_with(|| InstalledPackage::new(descriptor.clone()));
            installed.state = ExecutionState::Terminated;
            installed.storage = DEFAULT_STORAGE.to_string();
            installed.files = deployed;
            Ok(descriptor.clone())
        })
    }

    fn uninstall_package(
        &self,
        address: &DeviceAddress,
        package: &PackageDescriptor,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            console
                .packages
                .remove(package.full_name())
                .map(|_| ())
                .ok_or_else(|| BackendError::NotFound(format!("package {}", package)))
        })
    }

    fn register_package(
        &self,
        address: &DeviceAddress,
        package_path: &Path,
    ) -> Result<PackageDescriptor, BackendError> {
        let descriptor = descriptor_for(package_path)?;
        self.with_state(address, |console| {
            if console.packages.contains_key(descriptor.full_name()) {
                return Err(BackendError::Device(format!(
                    "package {} is already registered",
                    descriptor
                )));
            }
            console.packages.insert(
                descriptor.full_name().to_string(),
                InstalledPackage::new(descriptor.clone()),
            );
            Ok(descriptor)
        })
    }

    fn unregister_package(
        &self,
        address: &DeviceAddress,
        package_full_name: &str,
    ) -> Result<(), BackendError> {
        self.with_state(address, |console| {
            console
                .packages
                .remove(package_full_name)
                .map(|_| ())
                .ok_or_else(|| BackendError::NotFound(format!("package {}", package_full_name)))
        })
    }

    fn available_install_space(
        &self,
        address: &DeviceAddress,
        storage_name: Option<&str>,
    ) -> Result<u64, BackendError> {
        let storage = storage_name.unwrap_or(DEFAULT_STORAGE);
        self.with_state(address, |console| {
            let capacity = console
                .storages
                .get(storage)
                .copied()
                .ok_or_else(|| BackendError::NotFound(format!("storage {}", storage)))?;
            Ok(capacity.saturating_sub(console.used_bytes(storage)))
        })
    }
}

/// Package identity derived from the directory name
fn descriptor_for(path: &Path) -> Result<PackageDescriptor, BackendError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            BackendError::Device(format!(
                "cannot derive a package name from {}",
                path.display()
            ))
        })?;

    let family = format!("{}_sim", name);
    Ok(PackageDescriptor::new(format!("{}_1.0.0.0_x64__sim", name))
        .with_application(format!("{}!App", family))
        .with_family_name(family))
}

/// Regular files under `root` with their sizes, sorted by relative path.
/// Symlinks are followed. Entries that cannot be read are reported as
/// deployment errors and skipped.
async fn scan_tree(
    root: &Path,
    progress: &ProgressReporter,
) -> Result<Vec<(PathBuf, u64)>, BackendError> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let report = |path: &Path, e: std::io::Error| {
            progress.error(DeploymentError {
                file_path: relative(root, path),
                message: e.to_string(),
            })
        };

        // Linked directories can form cycles
        let canonical = match fs::canonicalize(&dir).await {
            Ok(canonical) => canonical,
            Err(e) if dir.as_path() == root => return Err(e.into()),
            Err(e) => {
                report(&dir, e);
                continue;
            }
        };
        if !visited.insert(canonical) {
            continue;
        }

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if dir.as_path() == root => return Err(e.into()),
            Err(e) => {
                report(&dir, e);
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    report(&dir, e);
                    break;
                }
            };

            let path = entry.path();
            let meta = match fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(e) => {
                    report(&path, e);
                    continue;
                }
            };

            if meta.is_dir() {
                pending.push(path);
            } else if let Err(e) = fs::File::open(&path).await {
                report(&path, e);
            } else {
                files.push((relative(root, &path), meta.len()));
            }
        }
    }

    files.sort();
    Ok(files)
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
