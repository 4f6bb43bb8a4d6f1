//! Errors surfaced by the job poll controller.

use vlmcap_core::error::{ErrorBody, STATUS_FETCH_FAILED};

use crate::api::ApiError;

/// Job submission failed; no poll session was started.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The service answered with a non-2xx status.
    #[error("Job submission rejected ({status}): {body}")]
    Rejected { status: u16, body: ErrorBody },

    /// The request never completed or the reply was unreadable.
    #[error("Job submission failed: {0}")]
    Api(#[source] ApiError),
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body } => Self::Rejected { status, body },
            other => Self::Api(other),
        }
    }
}

/// A status check failed and the poll session was terminated.
///
/// Cloneable so it can travel inside [`JobEvent`](crate::events::JobEvent).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// Non-2xx status. Displays the body's `detail`, or a generic text
    /// when there is none.
    #[error("{}", .detail.as_deref().unwrap_or(STATUS_FETCH_FAILED))]
    Status { status: u16, detail: Option<String> },

    #[error("Failed to fetch job status: {0}")]
    Transport(String),

    #[error("Malformed job status: {0}")]
    Malformed(String),

    /// No live session, or the response belongs to a superseded job.
    #[error("No active caption job")]
    Inactive,
}

impl From<ApiError> for PollError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Request(e) => Self::Transport(e.to_string()),
            ApiError::Status { status, body } => Self::Status {
                status,
                detail: body.detail().map(str::to_owned),
            },
            ApiError::Decode(e) => Self::Malformed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn poll_status_error_shows_detail() {
        let err = PollError::from(ApiError::Status {
            status: 409,
            body: ErrorBody::Detail("No captioning job is in progress".into()),
        });
        assert_eq!(err.to_string(), "No captioning job is in progress");
    }

    #[test]
    fn poll_status_error_without_detail_uses_fallback() {
        let err = PollError::from(ApiError::Status {
            status: 502,
            body: ErrorBody::Text("Bad Gateway".into()),
        });
        assert_matches!(err, PollError::Status { status: 502, detail: None });
        assert_eq!(err.to_string(), "Failed to fetch job status");
    }

    #[test]
    fn message_body_is_not_a_detail() {
        let err = PollError::from(ApiError::Status {
            status: 500,
            body: ErrorBody::Message("oops".into()),
        });
        assert_eq!(err.to_string(), "Failed to fetch job status");
    }

    #[test]
    fn malformed_json_maps_to_malformed() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_matches!(PollError::from(ApiError::Decode(decode)), PollError::Malformed(_));
    }

    #[test]
    fn submission_status_maps_to_rejected() {
        let err = SubmissionError::from(ApiError::Status {
            status: 400,
            body: ErrorBody::Detail("Directory '/nope' does not exist or is not a directory.".into()),
        });
        assert_matches!(err, SubmissionError::Rejected { status: 400, .. });
        assert_eq!(
            err.to_string(),
            "Job submission rejected (400): Directory '/nope' does not exist or is not a directory."
        );
    }
}
