//! Progress sinks and the backend-facing reporter

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::trace;

use crate::deploy::cancel::CancelSignal;
use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm};
use crate::models::deployment::{DeploymentError, DeploymentExtraFile, DeploymentMetric};

/// Caller-supplied receiver of one kind of progress event
pub struct Sink<T>(Arc<dyn Fn(T) + Send + Sync>);

impl<T> Sink<T> {
    pub fn new(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn deliver(&self, payload: T) {
        (self.0)(payload)
    }
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> fmt::Debug for Sink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sink")
    }
}

/// Forward events into a channel; events are dropped once the receiver is gone.
impl<T: Send + 'static> From<mpsc::UnboundedSender<T>> for Sink<T> {
    fn from(tx: mpsc::UnboundedSender<T>) -> Self {
        Sink::new(move |payload| {
            let _ = tx.send(payload);
        })
    }
}

/// The three optional progress channels of a push deployment
#[derive(Debug, Clone, Default)]
pub struct ProgressSinks {
    pub metric: Option<Sink<DeploymentMetric>>,
    pub error: Option<Sink<DeploymentError>>,
    pub extra_file: Option<Sink<DeploymentExtraFile>>,
}

/// Emitter handed to the backend during `deploy_push`.
///
/// Events reach the caller's sinks only while the deployment is in flight
/// and no cancellation has been requested. Delivery happens under the
/// deployment's state lock, so a sink must not block on the deployment
/// it reports for.
#[derive(Clone)]
pub struct ProgressReporter {
    sinks: Arc<ProgressSinks>,
    cancel: CancelSignal,
    fsm: Arc<Mutex<DeploymentFsm>>,
}

impl ProgressReporter {
    pub(crate) fn new(
        sinks: ProgressSinks,
        cancel: CancelSignal,
        fsm: Arc<Mutex<DeploymentFsm>>,
    ) -> Self {
        Self {
            sinks: Arc::new(sinks),
            cancel,
            fsm,
        }
    }

    /// A reporter that discards everything; for driving a backend directly
    pub fn detached() -> Self {
        let mut fsm = DeploymentFsm::new();
        let _ = fsm.process(DeploymentEvent::Start);
        Self::new(
            ProgressSinks::default(),
            CancelSignal::none(),
            Arc::new(Mutex::new(fsm)),
        )
    }

    pub fn metric(&self, metric: DeploymentMetric) {
        self.emit(self.sinks.metric.as_ref(), metric);
    }

    pub fn error(&self, error: DeploymentError) {
        self.emit(self.sinks.error.as_ref(), error);
    }

    pub fn extra_file(&self, extra_file: DeploymentExtraFile) {
        self.emit(self.sinks.extra_file.as_ref(), extra_file);
    }

    fn emit<T>(&self, sink: Option<&Sink<T>>, payload: T) {
        let Some(sink) = sink else {
            return;
        };

        let fsm = lock(&self.fsm);
        if !fsm.state().accepts_progress() || self.cancel.is_cancelled() {
            trace!("Dropping progress event, deployment is {:?}", fsm.state());
            return;
        }
        sink.deliver(payload);
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("sinks", &self.sinks)
            .finish()
    }
}

/// Lock the deployment state, recovering from a panicked sink
pub(crate) fn lock(fsm: &Mutex<DeploymentFsm>) -> MutexGuard<'_, DeploymentFsm> {
    fsm.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
