//! Job lifecycle state machine and reconciliation of status reports.
//!
//! [`JobState`] is the single owned state object of a controller: the
//! lifecycle phase, the job sequence number, the set of known files and
//! the current [`JobView`]. All transitions go through its methods.
//!
//! ```text
//! Idle    --begin_job--> Polling
//! Polling --apply_report, processed < total--> Polling
//! Polling --apply_report, processed >= total--> Done
//! Polling --fail--> Failed
//! Done | Failed --begin_job--> Polling
//! ```

use indexmap::IndexSet;

use crate::progress::JobProgress;
use crate::status::FileStatus;
use crate::types::{StatusReport, SubmitResponse};

/// Lifecycle phase of the current job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobPhase {
    #[default]
    Idle,
    Polling,
    Done,
    Failed {
        reason: String,
    },
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub name: String,
    pub status: FileStatus,
}

/// Everything needed to draw the progress bar, the two text lines and the
/// file table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobView {
    pub progress: JobProgress,
    /// Submission message, shown until the first status report arrives.
    pub banner: Option<String>,
    pub rows: Vec<FileRow>,
}

impl JobView {
    /// Second text line under the bar.
    pub fn extra_text(&self) -> String {
        match &self.banner {
            Some(message) => format!("{}; {message}", self.progress.outcome()),
            None => self.progress.outcome(),
        }
    }

    pub fn row(&self, name: &str) -> Option<&FileRow> {
        self.rows.iter().find(|row| row.name == name)
    }
}

/// What the poll loop should do after a report has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Continue,
    Finished,
}

#[derive(Debug, Default)]
pub struct JobState {
    phase: JobPhase,
    job_seq: u64,
    files: IndexSet<String>,
    view: JobView,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    /// Sequence number of the current job (`0` before the first one).
    pub fn job_seq(&self) -> u64 {
        self.job_seq
    }

    pub fn view(&self) -> &JobView {
        &self.view
    }

    /// Files known to belong to the current job, in discovery order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn is_polling(&self) -> bool {
        self.phase == JobPhase::Polling
    }

    /// Reset everything for a job the server just accepted and return its
    /// sequence number. Every listed file starts out queued.
    pub fn begin_job(&mut self, response: &SubmitResponse) -> u64 {
        self.job_seq += 1;
        self.files = response.files.iter().cloned().collect();
        self.view = JobView {
            progress: JobProgress::default(),
            banner: Some(response.message.clone()),
            rows: self
                .files
                .iter()
                .map(|name| FileRow {
                    name: name.clone(),
                    status: FileStatus::Queued,
                })
                .collect(),
        };
        self.phase = JobPhase::Polling;
        self.job_seq
    }

    /// Reconcile a status report into the view.
    ///
    /// The table is rebuilt from scratch: first every file the report
    /// mentions, in server order, then every known file the report left
    /// out, keeping its last status. Returns `None` (and changes nothing)
    /// when `job_seq` is not the job currently being polled.
    pub fn apply_report(&mut self, job_seq: u64, report: &StatusReport) -> Option<PollStep> {
        if !self.accepts(job_seq) {
            return None;
        }

        let mut rows = Vec::with_capacity(report.file_statuses.len().max(self.files.len()));
        for (name, raw) in &report.file_statuses {
            rows.push(FileRow {
                name: name.clone(),
                status: FileStatus::from_raw(raw),
            });
        }
        for name in &self.files {
            if !report.file_statuses.contains_key(name) {
                let status = self
                    .view
                    .row(name)
                    .map(|row| row.status.clone())
                    .unwrap_or_default();
                rows.push(FileRow {
                    name: name.clone(),
                    status,
                });
            }
        }
        self.files.extend(report.file_statuses.keys().cloned());

        let progress = report.progress();
        self.view = JobView {
            progress,
            banner: None,
            rows,
        };

        if progress.is_complete() {
            self.phase = JobPhase::Done;
            Some(PollStep::Finished)
        } else {
            Some(PollStep::Continue)
        }
    }

    /// Mark the current job as failed. Returns `false` for a stale
    /// `job_seq`, leaving the state untouched.
    pub fn fail(&mut self, job_seq: u64, reason: impl Into<String>) -> bool {
        if !self.accepts(job_seq) {
            return false;
        }
        self.phase = JobPhase::Failed {
            reason: reason.into(),
        };
        true
    }

    fn accepts(&self, job_seq: u64) -> bool {
        self.job_seq == job_seq && self.is_polling()
    }
}
