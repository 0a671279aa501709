//! Devconsole Library
//!
//! A uniform package lifecycle API over a fleet of development consoles.
//! Every call goes through [`facade::ConsoleFacade`], which validates its
//! inputs, dispatches to the active [`backend::ConsoleBackend`] and wraps
//! backend failures with the operation that produced them.

pub mod backend;
pub mod deploy;
pub mod errors;
pub mod facade;
pub mod logs;
pub mod models;
pub mod settings;

pub use backend::{BackendRegistry, ConsoleBackend, SimulatedConsole, UnsupportedBackend};
pub use deploy::{
    CancelSignal, CancelSource, DeployOptions, DeploymentHandle, ProgressReporter, ProgressSinks,
    Sink,
};
pub use errors::{BackendError, ConsoleError, NOT_SUPPORTED_MESSAGE};
pub use facade::ConsoleFacade;
pub use models::{
    ApplicationDescriptor, DeployOutcome, DeploymentError, DeploymentExtraFile, DeploymentMetric,
    DeviceAddress, ExecutionState, PackageDescriptor,
};
