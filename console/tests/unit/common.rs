//! Shared fixtures and stub backends

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use devconsole::{
    ApplicationDescriptor, BackendError, CancelSignal, ConsoleBackend, ConsoleError,
    ConsoleFacade, DeployOptions, DeviceAddress, ExecutionState, PackageDescriptor,
    ProgressReporter,
};

pub const CONSOLE: &str = "10.0.0.4";

pub fn package() -> PackageDescriptor {
    PackageDescriptor::new("Game_1.0.0.0_x64__8wekyb3d8bbwe")
        .with_family_name("Game_8wekyb3d8bbwe")
        .with_application("Game_8wekyb3d8bbwe!App")
}

pub fn application() -> ApplicationDescriptor {
    ApplicationDescriptor::new("Game_8wekyb3d8bbwe!App", package())
}

/// A facade call reduced to its success/failure
pub type Operation = Box<dyn Fn(&ConsoleFacade, &str) -> Result<(), ConsoleError>>;

/// Every public operation, each with a fragment of its failure context.
///
/// `deploy_push` only reports guard failures here; it needs a runtime to go
/// further and has dedicated tests.
pub fn every_operation(
    package: PackageDescriptor,
    application: ApplicationDescriptor,
) -> Vec<(&'static str, Operation)> {
    let p = package;
    let a = application;
    vec![
        op("installed packages", |f, addr| f.installed_packages(addr).map(|_| ())),
        {
            let p = p.clone();
            op("set debug mode (true)", move |f, addr| f.set_debug_mode(addr, &p, true))
        },
        {
            let a = a.clone();
            op("launch application", move |f, addr| f.launch_application(addr, &a))
        },
        {
            let a = a.clone();
            op("and arguments: -windowed", move |f, addr| {
                f.launch_application_with_arguments(addr, &a, "-windowed")
            })
        },
        {
            let p = p.clone();
            op("terminate package", move |f, addr| f.terminate_package(addr, &p))
        },
        {
            let p = p.clone();
            op("suspend package", move |f, addr| f.suspend_package(addr, &p))
        },
        {
            let p = p.clone();
            op("resume package", move |f, addr| f.resume_package(addr, &p))
        },
        {
            let p = p.clone();
            op("constrain package", move |f, addr| f.constrain_package(addr, &p))
        },
        {
            let p = p.clone();
            op("unconstrain package", move |f, addr| f.unconstrain_package(addr, &p))
        },
        {
            let a = a.clone();
            op("snap application", move |f, addr| f.snap_application(addr, &a))
        },
        op("unsnap application", |f, addr| f.unsnap_application(addr)),
        {
            let p = p.clone();
            op("query execution state", move |f, addr| {
                f.query_execution_state(addr, &p).map(|_| ())
            })
        },
        {
            let p = p.clone();
            op("uninstall package", move |f, addr| f.uninstall_package(addr, &p))
        },
        op("register package from '/devkit/loose/Game'", |f, addr| {
            f.register_package(addr, "/devkit/loose/Game").map(|_| ())
        }),
        op("unregister package 'Game_1.0.0.0_x64__8wekyb3d8bbwe'", |f, addr| {
            f.unregister_package(addr, "Game_1.0.0.0_x64__8wekyb3d8bbwe")
        }),
        op("app installation on storage 'external'", |f, addr| {
            f.available_install_space(addr, Some("external")).map(|_| ())
        }),
        op("deploy package from '/builds/Game'", |f, addr| {
            f.deploy_push(addr, "/builds/Game", DeployOptions::default())
                .map(|_| ())
        }),
    ]
}

fn op(
    context: &'static str,
    call: impl Fn(&ConsoleFacade, &str) -> Result<(), ConsoleError> + 'static,
) -> (&'static str, Operation) {
    (context, Box::new(call))
}

/// Backend that implements everything, counting calls.
/// Answers with success, or with a device failure when `failing`.
#[derive(Default)]
pub struct RecordingBackend {
    calls: AtomicUsize,
    failing: bool,
}

impl RecordingBackend {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T>(&self, value: T) -> Result<T, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            Err(BackendError::Device("link reset by console".to_string()))
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl ConsoleBackend for RecordingBackend {
    fn protocol_version(&self) -> &str {
        "recording"
    }

    fn installed_packages(&self, _: &DeviceAddress) -> Result<Vec<PackageDescriptor>, BackendError> {
        self.answer(vec![package()])
    }

    fn set_debug_mode(&self, _: &DeviceAddress, _: &PackageDescriptor, _: bool) -> Result<(), BackendError> {
        self.answer(())
    }

    fn launch_application(&self, _: &DeviceAddress, _: &ApplicationDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn launch_application_with_arguments(
        &self,
        _: &DeviceAddress,
        _: &ApplicationDescriptor,
        _: &str,
    ) -> Result<(), BackendError> {
        self.answer(())
    }

    fn terminate_package(&self, _: &DeviceAddress, _: &PackageDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn suspend_package(&self, _: &DeviceAddress, _: &PackageDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn resume_package(&self, _: &DeviceAddress, _: &PackageDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn constrain_package(&self, _: &DeviceAddress, _: &PackageDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn unconstrain_package(&self, _: &DeviceAddress, _: &PackageDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn snap_application(&self, _: &DeviceAddress, _: &ApplicationDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn unsnap_application(&self, _: &DeviceAddress) -> Result<(), BackendError> {
        self.answer(())
    }

    fn query_execution_state(
        &self,
        _: &DeviceAddress,
        _: &PackageDescriptor,
    ) -> Result<ExecutionState, BackendError> {
        self.answer(ExecutionState::Running)
    }

    async fn deploy_push(
        &self,
        _: &DeviceAddress,
        _: &Path,
        _: bool,
        _: &CancelSignal,
        _: &ProgressReporter,
    ) -> Result<PackageDescriptor, BackendError> {
        self.answer(package())
    }

    fn uninstall_package(&self, _: &DeviceAddress, _: &PackageDescriptor) -> Result<(), BackendError> {
        self.answer(())
    }

    fn register_package(&self, _: &DeviceAddress, _: &Path) -> Result<PackageDescriptor, BackendError> {
        self.answer(package())
    }

    fn unregister_package(&self, _: &DeviceAddress, _: &str) -> Result<(), BackendError> {
        self.answer(())
    }

    fn available_install_space(&self, _: &DeviceAddress, _: Option<&str>) -> Result<u64, BackendError> {
        self.answer(1 << 30)
    }
}
