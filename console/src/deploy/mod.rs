//! Push deployment pipeline

pub mod cancel;
pub mod fsm;
pub mod pipeline;
pub mod progress;

pub use cancel::{CancelSignal, CancelSource};
pub use fsm::{DeploymentEvent, DeploymentFsm, DeploymentState};
pub use pipeline::DeploymentHandle;
pub use progress::{ProgressReporter, ProgressSinks, Sink};

use crate::settings::Settings;

/// Options for a push deployment
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Delete files on the console that are not in the source tree
    pub remove_extra_files: bool,

    /// Cancellation signal; the default never fires
    pub cancel: CancelSignal,

    /// Progress sinks; omitted sinks discard their events
    pub sinks: ProgressSinks,
}

impl DeployOptions {
    /// Options seeded from the deploy section of the settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            remove_extra_files: settings.deploy.remove_extra_files,
            ..Default::default()
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_sinks(mut self, sinks: ProgressSinks) -> Self {
        self.sinks = sinks;
        self
    }
}
