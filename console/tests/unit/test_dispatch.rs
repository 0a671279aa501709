//! Capability dispatch and error wrapping tests

use std::error::Error as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use devconsole::{
    BackendError, BackendRegistry, ConsoleBackend, ConsoleError, ConsoleFacade, DeviceAddress,
    PackageDescriptor, SimulatedConsole, UnsupportedBackend, NOT_SUPPORTED_MESSAGE,
};
use devconsole::settings::Settings;
use tokio_test::{assert_err, assert_ok};

use crate::common::{application, every_operation, package, RecordingBackend, CONSOLE};

/// Only lists packages; everything else falls back to the defaults
#[derive(Default)]
struct ListOnlyBackend {
    listed: AtomicUsize,
}

impl ConsoleBackend for ListOnlyBackend {
    fn protocol_version(&self) -> &str {
        "list-only"
    }

    fn installed_packages(&self, _: &DeviceAddress) -> Result<Vec<PackageDescriptor>, BackendError> {
        self.listed.fetch_add(1, Ordering::SeqCst);
        Ok(vec![package()])
    }
}

fn sync_operations() -> impl Iterator<Item = (&'static str, crate::common::Operation)> {
    every_operation(package(), application())
        .into_iter()
        .filter(|(context, _)| !context.starts_with("deploy"))
}

#[test]
fn test_unimplemented_operations_are_not_supported() {
    let backend = Arc::new(ListOnlyBackend::default());
    let facade = ConsoleFacade::new(backend.clone());

    for (context, call) in sync_operations().filter(|(c, _)| *c != "installed packages") {
        let err = call(&facade, CONSOLE).unwrap_err();
        assert!(err.is_feature_not_supported(), "{}: {:?}", context, err);
        assert!(err.to_string().contains(context), "{}: {}", context, err);

        let cause = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(cause.contains(NOT_SUPPORTED_MESSAGE));
    }
    assert_eq!(backend.listed.load(Ordering::SeqCst), 0);

    let packages = assert_ok!(facade.installed_packages(CONSOLE));
    assert_eq!(packages, vec![package()]);
    assert_eq!(backend.listed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_launch_overloads_dispatch_independently() {
    struct PlainLaunchOnly;
    impl ConsoleBackend for PlainLaunchOnly {
        fn launch_application(
            &self,
            _: &DeviceAddress,
            _: &devconsole::ApplicationDescriptor,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    let facade = ConsoleFacade::new(Arc::new(PlainLaunchOnly));
    assert_ok!(facade.launch_application(CONSOLE, &application()));
    let err = assert_err!(facade.launch_application_with_arguments(CONSOLE, &application(), "-log"));
    assert!(err.is_feature_not_supported());
}

#[test]
fn test_backend_failures_are_wrapped_with_context() {
    let backend = Arc::new(RecordingBackend::failing());
    let facade = ConsoleFacade::new(backend.clone());

    let mut expected_calls = 0;
    for (context, call) in sync_operations() {
        let err = call(&facade, CONSOLE).unwrap_err();
        expected_calls += 1;

        match &err {
            ConsoleError::OperationFailed { context: message, address, source } => {
                assert!(message.contains(context), "{:?} lacks {:?}", message, context);
                assert_eq!(address, CONSOLE);
                assert!(matches!(source, BackendError::Device(m) if m == "link reset by console"));
            }
            other => panic!("{}: expected wrapped failure, got {:?}", context, other),
        }
        assert!(!err.is_feature_not_supported());
        assert_eq!(backend.calls(), expected_calls);
    }
}

#[test]
fn test_successful_calls_pass_results_through() {
    let facade = ConsoleFacade::new(Arc::new(RecordingBackend::succeeding()));
    assert_eq!(
        assert_ok!(facade.query_execution_state(CONSOLE, &package())),
        devconsole::ExecutionState::Running
    );
    assert_eq!(assert_ok!(facade.available_install_space(CONSOLE, None)), 1 << 30);
    assert_eq!(assert_ok!(facade.register_package(CONSOLE, "/devkit/loose/Game")), package());
}

#[test]
fn test_unsupported_backend_fails_every_operation() {
    let facade = ConsoleFacade::new(Arc::new(UnsupportedBackend));
    for (context, call) in sync_operations() {
        let err = call(&facade, CONSOLE).unwrap_err();
        assert!(err.is_feature_not_supported(), "{}: {:?}", context, err);
    }
}

#[test]
fn test_facade_from_settings_resolves_backend() {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(SimulatedConsole::new().with_console(CONSOLE)));

    let facade = ConsoleFacade::from_settings(&Settings::default(), &registry);
    assert_eq!(facade.backend().protocol_version(), SimulatedConsole::PROTOCOL_VERSION);
    assert_ok!(facade.installed_packages(CONSOLE));

    let settings = Settings {
        protocol_version: "2012.11".to_string(),
        ..Default::default()
    };
    let facade = ConsoleFacade::from_settings(&settings, &registry);
    assert!(facade.installed_packages(CONSOLE).unwrap_err().is_feature_not_supported());
}
