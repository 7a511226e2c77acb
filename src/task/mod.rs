//! # Task Model
//!
//! Handles, statuses, and the response shapes that flow between the engine,
//! the poll resolver, and the result cache.

pub mod handle;
pub mod status;

pub use handle::{InvalidHandle, TaskHandle};
pub use status::{CachedResponse, PollOutcome, Submission, TaskFailure, TaskStatus};
