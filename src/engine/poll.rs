//! Poll resolution
//!
//! Reads the cache entry for a handle and reports what the caller sees:
//!
//! | Stored        | Reported      | Cache effect               |
//! |---------------|---------------|----------------------------|
//! | absent        | UNSUBMITTED   | none                       |
//! | SUBMITTED     | PENDING       | rewritten to PENDING       |
//! | PENDING       | PENDING       | none                       |
//! | COMPLETE      | COMPLETE      | removed                    |
//! | ERROR         | ERROR         | removed                    |
//! | TIMEDOUT      | TIMEDOUT      | removed                    |
//!
//! Terminal entries are reported only by the poll whose `remove` returned
//! them, so each is observed exactly once across all pollers.
//! [`TaskEngine::poll_within`] keeps that guarantee when the caller stops
//! waiting: the poll runs to completion on its own task and an unseen
//! terminal outcome is written back.

use super::error::EngineResult;
use super::executor::TaskEngine;
use crate::cache::{CacheError, ResponseCache};
use crate::logging::log_task_operation;
use crate::task::{CachedResponse, PollOutcome, TaskHandle, TaskStatus};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, warn, Instrument};

impl<T, C> TaskEngine<T, C>
where
    T: Send + Sync + 'static,
    C: ResponseCache<T> + 'static,
{
    /// Poll by the textual handle a caller presented
    pub async fn poll(&self, handle: &str) -> EngineResult<PollOutcome<T>> {
        let handle: TaskHandle = handle.parse()?;
        self.poll_handle(handle).await
    }

    /// Poll by an already-parsed handle
    pub async fn poll_handle(&self, handle: TaskHandle) -> EngineResult<PollOutcome<T>> {
        loop {
            let Some(entry) = self.cache().get(handle).await? else {
                debug!(task_id = %handle, "Poll found no entry");
                return Ok(PollOutcome::Unsubmitted);
            };

            match entry.status() {
                TaskStatus::Pending => return Ok(PollOutcome::Pending),
                TaskStatus::Submitted => {
                    let replaced = self
                        .cache()
                        .replace_if_status(handle, TaskStatus::Submitted, CachedResponse::Pending)
                        .await?;
                    if replaced {
                        log_task_operation(self.operation(), &handle, TaskStatus::Pending, None);
                        return Ok(PollOutcome::Pending);
                    }
                    // The entry changed underneath us; resolve it again
                }
                _ => return self.consume(handle).await,
            }
        }
    }

    /// Poll, waiting at most `limit` for the answer
    ///
    /// Elapsing reports [`CacheError::Timeout`] without cancelling the cache
    /// calls already in flight.
    pub async fn poll_within(
        &self,
        handle: TaskHandle,
        limit: Duration,
    ) -> EngineResult<PollOutcome<T>> {
        let (reply, answer) = oneshot::channel();
        let engine = self.clone();

        tokio::spawn(
            async move {
                let outcome = engine.poll_handle(handle).await;
                if let Err(Ok(unseen)) = reply.send(outcome) {
                    engine.restore(handle, unseen).await;
                }
            }
            .in_current_span(),
        );

        match tokio::time::timeout(limit, answer).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(CacheError::BackendError(format!(
                "poll of task {handle} ended without an answer"
            ))
            .into()),
            Err(_) => Err(CacheError::Timeout(format!("no cache response within {limit:?}")).into()),
        }
    }

    /// Write back a terminal outcome that no caller received
    async fn restore(&self, handle: TaskHandle, unseen: PollOutcome<T>) {
        let response = match unseen {
            PollOutcome::Complete(body) => CachedResponse::Complete(body),
            PollOutcome::Error(failure) => CachedResponse::Error(failure),
            PollOutcome::TimedOut(failure) => CachedResponse::TimedOut(failure),
            PollOutcome::Pending | PollOutcome::Unsubmitted => return,
        };
        let status = response.status();

        match self.cache().put(handle, response).await {
            Ok(()) => warn!(
                operation = %self.operation(),
                task_id = %handle,
                status = %status,
                "Poll abandoned by caller; terminal outcome restored"
            ),
            Err(e) => error!(
                operation = %self.operation(),
                task_id = %handle,
                status = %status,
                error = %e,
                "Failed to restore terminal outcome of abandoned poll"
            ),
        }
    }

    async fn consume(&self, handle: TaskHandle) -> EngineResult<PollOutcome<T>> {
        match self.cache().remove(handle).await? {
            Some(removed) => {
                let outcome = PollOutcome::from(removed);
                log_task_operation(
                    self.operation(),
                    &handle,
                    outcome.status(),
                    Some("consumed"),
                );
                Ok(outcome)
            }
            None => {
                debug!(task_id = %handle, "Terminal entry consumed by another poller");
                Ok(PollOutcome::Unsubmitted)
            }
        }
    }
}
