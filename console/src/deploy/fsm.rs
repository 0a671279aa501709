//! Finite state machine for a single push deployment

use serde::{Deserialize, Serialize};

/// Deployment state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentState {
    /// Created, backend work not started
    Pending,

    /// Backend work in flight
    Deploying,

    /// Cancellation requested, waiting for the backend to acknowledge
    Cancelling,

    /// Package deployed
    Deployed,

    /// Deployment failed
    Failed,

    /// Backend acknowledged the cancellation
    Cancelled,
}

impl DeploymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentState::Deployed | DeploymentState::Failed | DeploymentState::Cancelled
        )
    }

    /// Progress events are only delivered while deploying
    pub fn accepts_progress(&self) -> bool {
        *self == DeploymentState::Deploying
    }
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Backend work started
    Start,

    /// Caller triggered the cancellation signal
    CancelRequested,

    /// Backend produced a package
    Succeeded,

    /// Backend failed
    Failed(String),

    /// Backend acknowledged cancellation
    Cancelled,
}

/// Deployment FSM
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: DeploymentState,
    error: Option<String>,
}

impl DeploymentFsm {
    /// Create a new FSM in pending state
    pub fn new() -> Self {
        Self {
            state: DeploymentState::Pending,
            error: None,
        }
    }

    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Failure message once the deployment has failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeploymentEvent) -> Result<(), String> {
        let new_state = match (&self.state, &event) {
            (DeploymentState::Pending, DeploymentEvent::Start) => DeploymentState::Deploying,

            (DeploymentState::Deploying, DeploymentEvent::CancelRequested) => {
                DeploymentState::Cancelling
            }

            // The backend may finish the push before it notices the request
            (
                DeploymentState::Deploying | DeploymentState::Cancelling,
                DeploymentEvent::Succeeded,
            ) => DeploymentState::Deployed,
            (
                DeploymentState::Deploying | DeploymentState::Cancelling,
                DeploymentEvent::Failed(err),
            ) => {
                self.error = Some(err.clone());
                DeploymentState::Failed
            }
            (
                DeploymentState::Deploying | DeploymentState::Cancelling,
                DeploymentEvent::Cancelled,
            ) => DeploymentState::Cancelled,

            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
