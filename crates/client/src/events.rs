//! Events published by the job poll controller.
//!
//! Each event that carries a [`JobView`] carries the complete view; a
//! front end redraws from it instead of applying a diff.

use vlmcap_core::state::JobView;

use crate::error::PollError;

#[derive(Debug, Clone)]
pub enum JobEvent {
    /// The service accepted a job; every file is queued.
    Submitted { job_seq: u64, view: JobView },

    /// A status report was applied.
    Progress { job_seq: u64, view: JobView },

    /// The last report showed every file processed. Follows the
    /// `Progress` event for that report; polling has stopped.
    Completed { job_seq: u64, view: JobView },

    /// A status check failed; polling has stopped.
    PollFailed { job_seq: u64, error: PollError },
}

impl JobEvent {
    pub fn job_seq(&self) -> u64 {
        match self {
            Self::Submitted { job_seq, .. }
            | Self::Progress { job_seq, .. }
            | Self::Completed { job_seq, .. }
            | Self::PollFailed { job_seq, .. } => *job_seq,
        }
    }
}
