//! Pure domain model for the caption job controller.
//!
//! Holds the wire types of the caption service, the per-file status
//! interpretation, progress arithmetic, the job state machine and the
//! plain-text renderer. Nothing in this crate performs I/O.

pub mod error;
pub mod progress;
pub mod render;
pub mod state;
pub mod status;
pub mod types;
