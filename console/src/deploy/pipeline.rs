//! Spawns and drives a push deployment

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::ready;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::backend::ConsoleBackend;
use crate::deploy::cancel::CancelSignal;
use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentState};
use crate::deploy::progress::{lock, ProgressReporter};
use crate::deploy::DeployOptions;
use crate::errors::{BackendError, ConsoleError};
use crate::facade::invoke::{perform_async, wrap_failure};
use crate::models::address::DeviceAddress;
use crate::models::deployment::DeployOutcome;

/// An in-flight push deployment.
///
/// Resolves to the deployed package, the cancellation outcome, or a
/// wrapped failure. Dropping the handle does not stop the deployment.
#[derive(Debug)]
pub struct DeploymentHandle {
    id: Uuid,
    started_at: DateTime<Utc>,
    address: DeviceAddress,
    context: String,
    fsm: Arc<Mutex<DeploymentFsm>>,
    task: JoinHandle<Result<DeployOutcome, ConsoleError>>,
}

impl DeploymentHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current state of the deployment
    pub fn state(&self) -> DeploymentState {
        lock(&self.fsm).state().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for DeploymentHandle {
    type Output = Result<DeployOutcome, ConsoleError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let joined = ready!(Pin::new(&mut this.task).poll(cx));

        Poll::Ready(match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = if e.is_panic() { "panicked" } else { "was aborted" };
                let source =
                    BackendError::Other(anyhow::anyhow!("deployment task {}: {}", reason, e));
                transition(&this.fsm, DeploymentEvent::Failed(source.to_string()));
                Err(wrap_failure(&this.address, this.context.clone(), source))
            }
        })
    }
}

/// Start a push deployment on the current Tokio runtime
pub(crate) fn start(
    backend: Arc<dyn ConsoleBackend>,
    address: DeviceAddress,
    source: PathBuf,
    options: DeployOptions,
) -> Result<DeploymentHandle, ConsoleError> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| ConsoleError::Internal(format!("push deployment needs a Tokio runtime: {}", e)))?;

    let id = Uuid::new_v4();
    let context = format!("Failed to deploy package from '{}'", source.display());
    let DeployOptions {
        remove_extra_files,
        cancel,
        sinks,
    } = options;

    let fsm = Arc::new(Mutex::new(DeploymentFsm::new()));
    transition(&fsm, DeploymentEvent::Start);
    let reporter = ProgressReporter::new(sinks, cancel.clone(), fsm.clone());

    let span = info_span!("deploy", %id, console = %address);
    let task = runtime.spawn(
        drive(
            backend,
            address.clone(),
            source,
            remove_extra_files,
            cancel,
            reporter,
            fsm.clone(),
            context.clone(),
        )
        .instrument(span),
    );

    Ok(DeploymentHandle {
        id,
        started_at: Utc::now(),
        address,
        context,
        fsm,
        task,
    })
}

#[allow(clippy::too_many_arguments)]
async fn drive(
    backend: Arc<dyn ConsoleBackend>,
    address: DeviceAddress,
    source: PathBuf,
    remove_extra_files: bool,
    cancel: CancelSignal,
    reporter: ProgressReporter,
    fsm: Arc<Mutex<DeploymentFsm>>,
    context: String,
) -> Result<DeployOutcome, ConsoleError> {
    info!(
        source = %source.display(),
        remove_extra_files,
        backend = backend.protocol_version(),
        "Starting push deployment"
    );

    let work = async {
        let push = backend.deploy_push(&address, &source, remove_extra_files, &cancel, &reporter);
        tokio::pin!(push);

        let mut cancel_requested = false;
        let result = loop {
            tokio::select! {
                result = &mut push => break result,
                _ = cancel.cancelled(), if !cancel_requested => {
                    cancel_requested = true;
                    info!("Cancellation requested, waiting for the console to acknowledge");
                    transition(&fsm, DeploymentEvent::CancelRequested);
                }
            }
        };

        match result {
            Ok(package) => Ok(DeployOutcome::Deployed(package)),
            Err(BackendError::Cancelled) if cancel.is_cancelled() => Ok(DeployOutcome::Cancelled),
            Err(e) => Err(e),
        }
    };

    let outcome = perform_async(&address, "deploy_push", context, work).await;

    match &outcome {
        Ok(DeployOutcome::Deployed(package)) => {
            transition(&fsm, DeploymentEvent::Succeeded);
            info!("Deployed package {}", package.full_name());
        }
        Ok(DeployOutcome::Cancelled) => {
            transition(&fsm, DeploymentEvent::Cancelled);
            info!("Deployment cancelled");
        }
        Err(e) => {
            transition(&fsm, DeploymentEvent::Failed(e.to_string()));
        }
    }

    outcome
}

fn transition(fsm: &Mutex<DeploymentFsm>, event: DeploymentEvent) {
    if let Err(e) = lock(fsm).process(event) {
        warn!("Ignoring deployment event: {}", e);
    }
}
