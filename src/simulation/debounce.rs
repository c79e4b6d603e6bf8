//! Debounced live recomputation
//!
//! Cancel-and-reschedule: each call aborts the pending job and starts a new
//! timer, so only the last call of a burst runs.

use super::{simulate, Scenario, SimulationResult};
use crate::models::QuestionnaireAnswers;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct Debouncer<T> {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    output: Arc<watch::Sender<Option<T>>>,
}

impl<T: Send + Sync + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        let (output, _) = watch::channel(None);
        Self {
            delay,
            pending: Mutex::new(None),
            output: Arc::new(output),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.output.subscribe()
    }

    /// Schedule `job` after the delay, cancelling any job not yet run.
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&self, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let output = Arc::clone(&self.output);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            output.send_replace(Some(job()));
        }));
    }

    /// Cancel the pending job, if any
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

/// What-if slider backend: recompute only once adjustments settle
pub struct LiveSimulator {
    answers: Arc<QuestionnaireAnswers>,
    debouncer: Debouncer<Arc<SimulationResult>>,
}

impl LiveSimulator {
    pub fn new(answers: QuestionnaireAnswers) -> Self {
        Self::with_delay(answers, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(answers: QuestionnaireAnswers, delay: Duration) -> Self {
        Self {
            answers: Arc::new(answers),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<SimulationResult>>> {
        self.debouncer.subscribe()
    }

    /// Record the latest adjustment snapshot
    pub fn update(&self, scenario: Scenario) {
        debug!(?scenario, "What-if adjustment received");
        let answers = Arc::clone(&self.answers);
        self.debouncer
            .call(move || Arc::new(simulate(&answers, &scenario)));
    }
}
