//! Domain models

pub mod address;
pub mod deployment;
pub mod package;

pub use address::DeviceAddress;
pub use deployment::{DeployOutcome, DeploymentError, DeploymentExtraFile, DeploymentMetric};
pub use package::{ApplicationDescriptor, ExecutionState, PackageDescriptor};
