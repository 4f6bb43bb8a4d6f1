//! Caption service client and job poll controller.
//!
//! [`api::CaptionServiceApi`] wraps the HTTP endpoints of the caption
//! service. [`controller::JobPollController`] submits directory jobs and
//! tracks them through a self-scheduling [`session::PollSession`],
//! publishing [`events::JobEvent`]s for whatever front end renders them.

pub mod api;
pub mod controller;
pub mod error;
pub mod events;
pub mod model;
pub mod session;

pub use api::{ApiError, CaptionServiceApi, JobApi};
pub use controller::{JobPollController, DEFAULT_POLL_INTERVAL};
pub use error::{PollError, SubmissionError};
pub use events::JobEvent;
pub use session::PollOutcome;
