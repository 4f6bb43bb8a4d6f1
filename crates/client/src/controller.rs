//! Job poll controller: submit a directory job, then poll it to the end.
//!
//! The controller exclusively owns the current [`PollSession`] and the
//! [`JobState`] it reconciles into. Submitting a new job stops the old
//! session before the new one starts, so there is never more than one
//! poll loop per controller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use vlmcap_core::state::{JobPhase, JobState, JobView};
use vlmcap_core::types::{JobRequest, SubmitResponse};

use crate::api::JobApi;
use crate::error::{PollError, SubmissionError};
use crate::events::JobEvent;
use crate::session::{PollOutcome, PollSession, PollWorker};

/// Delay between the end of one status check and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Broadcast channel capacity for job events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct JobPollController<A> {
    api: Arc<A>,
    interval: Duration,
    state: Arc<Mutex<JobState>>,
    session: Option<PollSession<A>>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl<A: JobApi> JobPollController<A> {
    /// Create an idle controller polling every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(api: A) -> Self {
        Self::with_interval(api, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(api: A, interval: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api: Arc::new(api),
            interval,
            state: Arc::new(Mutex::new(JobState::new())),
            session: None,
            event_tx,
        }
    }

    /// Subscribe to job events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Submit a directory job and start polling it.
    ///
    /// On failure nothing changes: no session starts and a job that is
    /// already being polled keeps being polled. On success the previous
    /// session is stopped first, the view is reset to one queued row per
    /// file, and a new session starts.
    pub async fn submit_job(
        &mut self,
        request: &JobRequest,
    ) -> Result<SubmitResponse, SubmissionError> {
        tracing::info!(
            directory = %request.directory_path,
            model = %request.model,
            prompt = %request.prompt,
            "Submitting caption job",
        );

        let response = match self.api.submit_job(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Caption job submission failed");
                return Err(e.into());
            }
        };

        if let Some(previous) = self.session.take() {
            tracing::info!(job_seq = previous.job_seq(), "Stopping previous poll session");
            previous.stop().await;
        }

        let (job_seq, view) = {
            let mut state = self.state.lock().await;
            let job_seq = state.begin_job(&response);
            (job_seq, state.view().clone())
        };

        tracing::info!(
            job_seq,
            files = response.files.len(),
            message = %response.message,
            "Caption job started",
        );
        let _ = self.event_tx.send(JobEvent::Submitted { job_seq, view });

        let worker = PollWorker::new(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            self.event_tx.clone(),
            job_seq,
        );
        self.session = Some(PollSession::start(worker, self.interval));

        Ok(response)
    }

    /// Run one status check for the current job right now.
    ///
    /// Has the same effect as a timer tick: completion or failure stops
    /// the session. Waits for a timer check that is already in flight, and
    /// restarts the interval once it settles. Returns
    /// [`PollError::Inactive`] when no job is being polled.
    pub async fn poll_once(&self) -> Result<PollOutcome, PollError> {
        match &self.session {
            Some(session) => session.poll_once().await,
            None => Err(PollError::Inactive),
        }
    }

    /// Whether a poll loop is currently scheduled.
    pub fn is_polling(&self) -> bool {
        self.session.as_ref().is_some_and(PollSession::is_active)
    }

    pub async fn phase(&self) -> JobPhase {
        self.state.lock().await.phase().clone()
    }

    /// Snapshot of the current view.
    pub async fn view(&self) -> JobView {
        self.state.lock().await.view().clone()
    }

    /// Stop polling without starting a new job. The view and phase are
    /// left as they are.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(job_seq = session.job_seq(), "Shutting down poll session");
            session.stop().await;
        }
    }
}
