//! Package and application models

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An installed package, identified by the full name the console assigns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Unique full name (e.g. `Game_1.0.0.0_x64__8wekyb3d8bbwe`)
    full_name: String,

    /// Package family name
    #[serde(default)]
    family_name: Option<String>,

    /// AUMIDs of the applications the package declares
    #[serde(default)]
    application_ids: Vec<String>,
}

impl PackageDescriptor {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            family_name: None,
            application_ids: Vec::new(),
        }
    }

    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    pub fn with_application(mut self, aumid: impl Into<String>) -> Self {
        self.application_ids.push(aumid.into());
        self
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    /// Applications declared by this package
    pub fn applications(&self) -> impl Iterator<Item = ApplicationDescriptor> + '_ {
        self.application_ids
            .iter()
            .map(move |aumid| ApplicationDescriptor::new(aumid.clone(), self.clone()))
    }
}

// Identity is the full name alone.
impl PartialEq for PackageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

impl Eq for PackageDescriptor {}

impl Hash for PackageDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name.hash(state);
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// A launchable application within a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    /// Application user model ID
    aumid: String,

    /// Owning package
    package: PackageDescriptor,
}

impl ApplicationDescriptor {
    pub fn new(aumid: impl Into<String>, package: PackageDescriptor) -> Self {
        Self {
            aumid: aumid.into(),
            package,
        }
    }

    pub fn aumid(&self) -> &str {
        &self.aumid
    }

    pub fn package(&self) -> &PackageDescriptor {
        &self.package
    }
}

/// Lifecycle state of a package on the console
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    #[default]
    Unknown,
    Running,
    Suspending,
    Suspended,
    Terminated,
    Constrained,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Unknown => "unknown",
            ExecutionState::Running => "running",
            ExecutionState::Suspending => "suspending",
            ExecutionState::Suspended => "suspended",
            ExecutionState::Terminated => "terminated",
            ExecutionState::Constrained => "constrained",
        };
        f.write_str(name)
    }
}
