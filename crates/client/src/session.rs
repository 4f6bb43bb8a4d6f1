//! Self-scheduling poll loop for one submitted job.
//!
//! A [`PollSession`] sleeps for the poll interval, runs one status check,
//! and only schedules the next sleep once that check has settled. Manual
//! checks share the same in-flight gate, so at most one status request is
//! ever outstanding, and they restart the interval when they settle. The
//! loop ends when the job completes, a check fails, or the session is
//! stopped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use vlmcap_core::state::{JobState, JobView, PollStep};

use crate::api::JobApi;
use crate::error::PollError;
use crate::events::JobEvent;

/// Result of one successful status check.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// The view after the report was applied.
    pub view: JobView,
    /// `true` when `processed >= total`; no further checks will run.
    pub finished: bool,
}

/// Runs status checks for one job against the shared state.
pub(crate) struct PollWorker<A> {
    api: Arc<A>,
    state: Arc<Mutex<JobState>>,
    events: broadcast::Sender<JobEvent>,
    job_seq: u64,
    cancel: CancellationToken,
    /// Held for the whole of a check, timer or manual.
    in_flight: Mutex<()>,
    /// Signalled when a manual check settles.
    rescheduled: Notify,
}

impl<A: JobApi> PollWorker<A> {
    pub(crate) fn new(
        api: Arc<A>,
        state: Arc<Mutex<JobState>>,
        events: broadcast::Sender<JobEvent>,
        job_seq: u64,
    ) -> Self {
        Self {
            api,
            state,
            events,
            job_seq,
            cancel: CancellationToken::new(),
            in_flight: Mutex::new(()),
            rescheduled: Notify::new(),
        }
    }

    /// Fetch the job status once and reconcile it into the state.
    ///
    /// Waits for any check already in flight. Completion and failure both
    /// cancel the session token. A response that lands after the session
    /// was cancelled, or for a superseded job, is dropped with
    /// [`PollError::Inactive`].
    pub(crate) async fn poll_once(&self) -> Result<PollOutcome, PollError> {
        let _in_flight = self.in_flight.lock().await;
        if self.cancel.is_cancelled() {
            return Err(PollError::Inactive);
        }

        let result = self.api.job_status().await;

        let mut state = self.state.lock().await;
        if self.cancel.is_cancelled() {
            return Err(PollError::Inactive);
        }

        match result {
            Ok(report) => {
                let Some(step) = state.apply_report(self.job_seq, &report) else {
                    return Err(PollError::Inactive);
                };
                let view = state.view().clone();
                drop(state);

                tracing::debug!(
                    job_seq = self.job_seq,
                    processed = view.progress.processed,
                    total = view.progress.total,
                    "Applied job status",
                );
                let _ = self.events.send(JobEvent::Progress {
                    job_seq: self.job_seq,
                    view: view.clone(),
                });

                let finished = step == PollStep::Finished;
                if finished {
                    self.cancel.cancel();
                    tracing::info!(
                        job_seq = self.job_seq,
                        captioned = view.progress.captioned,
                        errors = view.progress.errors,
                        "Caption job finished",
                    );
                    let _ = self.events.send(JobEvent::Completed {
                        job_seq: self.job_seq,
                        view: view.clone(),
                    });
                }

                Ok(PollOutcome { view, finished })
            }
            Err(e) => {
                let error = PollError::from(e);
                if !state.fail(self.job_seq, error.to_string()) {
                    return Err(PollError::Inactive);
                }
                drop(state);

                // No retry: the user resubmits to start over.
                self.cancel.cancel();
                tracing::warn!(job_seq = self.job_seq, error = %error, "Job status check failed");
                let _ = self.events.send(JobEvent::PollFailed {
                    job_seq: self.job_seq,
                    error: error.clone(),
                });

                Err(error)
            }
        }
    }
}

/// Handle to the running poll loop of one job.
///
/// Dropping the session cancels the loop; [`stop`](Self::stop) also waits
/// for the task to exit.
pub struct PollSession<A> {
    worker: Arc<PollWorker<A>>,
    handle: JoinHandle<()>,
    cancel_guard: DropGuard,
}

impl<A: JobApi> PollSession<A> {
    /// Spawn the poll loop. The first check runs one `interval` after
    /// this call.
    pub(crate) fn start(worker: PollWorker<A>, interval: Duration) -> Self {
        let guard = worker.cancel.clone().drop_guard();
        let worker = Arc::new(worker);
        let handle = tokio::spawn(run_loop(Arc::clone(&worker), interval));

        Self {
            worker,
            handle,
            cancel_guard: guard,
        }
    }

    pub fn job_seq(&self) -> u64 {
        self.worker.job_seq
    }

    /// Whether further status checks will be scheduled.
    pub fn is_active(&self) -> bool {
        !self.worker.cancel.is_cancelled() && !self.handle.is_finished()
    }

    /// Run one check now. The next timer check is one interval after this
    /// one settles.
    pub(crate) async fn poll_once(&self) -> Result<PollOutcome, PollError> {
        let result = self.worker.poll_once().await;
        self.worker.rescheduled.notify_one();
        result
    }

    /// Cancel the loop (including an in-flight check) and wait for the
    /// task to exit.
    pub async fn stop(self) {
        let Self {
            worker,
            handle,
            cancel_guard,
        } = self;
        drop(cancel_guard);

        if let Err(e) = handle.await {
            if e.is_panic() {
                tracing::error!(job_seq = worker.job_seq, error = %e, "Poll loop panicked");
            }
        }
    }
}

async fn run_loop<A: JobApi>(worker: Arc<PollWorker<A>>, interval: Duration) {
    let cancel = worker.cancel.clone();
    tracing::debug!(
        job_seq = worker.job_seq,
        interval_ms = interval.as_millis() as u64,
        "Poll loop started",
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = worker.rescheduled.notified() => continue,
            _ = tokio::time::sleep(interval) => {}
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            result = worker.poll_once() => {
                if result.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(job_seq = worker.job_seq, "Poll loop exited");
}
