//! # Long Call Handlers
//!
//! Submit and poll endpoints for the demo long-running operation.

use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};

use crate::cache::CacheError;
use crate::engine::{EngineError, EngineResult};
use crate::task::{PollOutcome, Submission, TaskHandle};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::{AppState, DemoResult};

/// Optional body of `POST /long-call/submit`
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Bounded wait in seconds
    pub timeout: Option<f64>,
}

impl SubmitRequest {
    /// Parse the raw body; an empty body means "use the defaults"
    pub fn from_body(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// Resolve the timeout; negative or non-finite values become zero and
    /// are rejected by the engine
    pub fn timeout_or(&self, default: Duration) -> Duration {
        match self.timeout {
            None => default,
            Some(seconds) => Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO),
        }
    }
}

/// Submit the demo operation: POST /long-call/submit
///
/// Answers `202 Accepted` with `Task-Id` and `Task-Status: submitted`.
pub async fn submit(State(state): State<AppState>, body: Bytes) -> ApiResult<Submission> {
    let request = SubmitRequest::from_body(&body)?;
    let timeout = request.timeout_or(state.config.default_task_timeout);
    let delay = state.config.demo_delay;

    let span = info_span!("long_call.submit", timeout_ms = timeout.as_millis() as u64);
    let engine = Arc::clone(&state.engine);
    let submission = bounded(
        state.config.request_timeout,
        async move { engine.submit(move || demo_operation(delay), timeout).await }
            .instrument(span),
    )
    .await?;

    debug!(task_id = %submission.handle, "Long call submitted");
    Ok(submission)
}

/// Poll the demo operation: GET /long-call/poll/:id
pub async fn poll(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PollOutcome<DemoResult>> {
    let handle = id.parse::<TaskHandle>().map_err(EngineError::from)?;
    let span = info_span!("long_call.poll", task_id = %handle);
    let outcome = state
        .engine
        .poll_within(handle, state.config.request_timeout)
        .instrument(span)
        .await?;

    debug!(task_id = %id, status = %outcome.status(), "Long call polled");
    Ok(outcome)
}

/// The demo long-running operation
fn demo_operation(delay: Duration) -> Result<DemoResult, Infallible> {
    std::thread::sleep(delay);
    Ok(vec!["Hello".to_string(), "Client!".to_string()])
}

/// Run an engine call on its own task and wait at most `limit` for it
///
/// The call always runs to completion; only the wait is bounded.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = EngineResult<T>> + Send + 'static,
) -> ApiResult<T>
where
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::spawn(call)).await {
        Ok(Ok(result)) => result.map_err(ApiError::from),
        Ok(Err(join_error)) => Err(CacheError::BackendError(format!(
            "engine call failed: {join_error}"
        ))
        .into()),
        Err(_) => Err(CacheError::Timeout(format!("no cache response within {limit:?}")).into()),
    }
}
