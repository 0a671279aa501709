//! Deployment progress models

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::package::PackageDescriptor;

/// File transfer counters for an in-flight push deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentMetric {
    /// Files in the source tree
    pub total_files: u64,

    /// Bytes in the source tree
    pub total_bytes: u64,

    /// Files copied to the console so far
    pub transferred_files: u64,

    /// Bytes copied to the console so far
    pub transferred_bytes: u64,

    /// Files already up to date on the console
    pub skipped_files: u64,

    /// Bytes already up to date on the console
    pub skipped_bytes: u64,
}

impl DeploymentMetric {
    /// Files handled so far, copied or skipped
    pub fn processed_files(&self) -> u64 {
        self.transferred_files + self.skipped_files
    }
}

/// A non-fatal failure on a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentError {
    pub file_path: PathBuf,
    pub message: String,
}

/// A file present on the console but not in the source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentExtraFile {
    pub file_path: PathBuf,
}

/// Final state of a deployment that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed(PackageDescriptor),
    Cancelled,
}

impl DeployOutcome {
    pub fn package(&self) -> Option<&PackageDescriptor> {
        match self {
            DeployOutcome::Deployed(package) => Some(package),
            DeployOutcome::Cancelled => None,
        }
    }

    pub fn into_package(self) -> Option<PackageDescriptor> {
        match self {
            DeployOutcome::Deployed(package) => Some(package),
            DeployOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DeployOutcome::Cancelled)
    }
}
