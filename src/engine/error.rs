//! Engine error types

use crate::cache::CacheError;
use crate::task::InvalidHandle;
use std::time::Duration;
use thiserror::Error;

/// Errors returned synchronously by `submit` and `poll`
///
/// Failures of the work itself never surface here; they are recorded in the
/// cache and reported by a later poll.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Timeout must be a positive duration, got {0:?}")]
    InvalidTimeout(Duration),

    #[error(transparent)]
    InvalidHandle(#[from] InvalidHandle),

    #[error("Result cache unavailable: {0}")]
    Cache(#[from] CacheError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
