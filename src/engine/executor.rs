//! Submission and supervised execution of long-running work
//!
//! `submit` records a SUBMITTED entry and returns at once. The work runs on
//! the runtime's worker pools while a lightweight supervisor task waits on it
//! with a bounded timeout and writes exactly one terminal entry.

use super::error::{EngineError, EngineResult};
use crate::cache::ResponseCache;
use crate::logging::log_task_operation;
use crate::task::{CachedResponse, Submission, TaskFailure, TaskHandle, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

/// What happens to work that outlives its bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Stop waiting and discard any late result; the work keeps running
    #[default]
    Detach,
    /// Abort async work at its next await point. Blocking work cannot be
    /// pre-empted and is always detached.
    Abort,
}

/// Runs one kind of long-running operation against a result cache
///
/// Construct one engine per distinct operation; `operation` names it in logs.
/// `C` is usually [`CacheProvider<T>`](crate::cache::CacheProvider).
pub struct TaskEngine<T, C> {
    operation: Arc<str>,
    cache: Arc<C>,
    timeout_policy: TimeoutPolicy,
    _result: PhantomData<fn() -> T>,
}

impl<T, C> Clone for TaskEngine<T, C> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            cache: Arc::clone(&self.cache),
            timeout_policy: self.timeout_policy,
            _result: PhantomData,
        }
    }
}

impl<T, C> fmt::Debug for TaskEngine<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskEngine")
            .field("operation", &self.operation)
            .field("timeout_policy", &self.timeout_policy)
            .finish()
    }
}

impl<T, C> TaskEngine<T, C>
where
    T: Send + Sync + 'static,
    C: ResponseCache<T> + 'static,
{
    pub fn new(operation: impl Into<String>, cache: Arc<C>) -> Self {
        Self {
            operation: Arc::from(operation.into()),
            cache,
            timeout_policy: TimeoutPolicy::default(),
            _result: PhantomData,
        }
    }

    pub fn with_timeout_policy(mut self, timeout_policy: TimeoutPolicy) -> Self {
        self.timeout_policy = timeout_policy;
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        self.timeout_policy
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Submit a blocking unit of work
    ///
    /// The closure runs on the blocking worker pool, which reuses an idle
    /// thread or spawns a new one, so submissions never queue behind each
    /// other. Returns once the SUBMITTED entry is stored.
    pub async fn submit<F, E>(&self, work: F, timeout: Duration) -> EngineResult<Submission>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let handle = self.accept(timeout).await?;

        let worker =
            tokio::task::spawn_blocking(move || work().map_err(|e| TaskFailure::from_error(&e)));
        self.supervise(handle, worker, timeout, TimeoutPolicy::Detach);

        Ok(Submission::accepted(handle))
    }

    /// Submit an async unit of work
    ///
    /// The future is spawned onto the multi-threaded runtime. Under
    /// [`TimeoutPolicy::Abort`] it is aborted when the timeout elapses.
    pub async fn submit_async<Fut, E>(
        &self,
        work: Fut,
        timeout: Duration,
    ) -> EngineResult<Submission>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let handle = self.accept(timeout).await?;

        let worker =
            tokio::spawn(async move { work.await.map_err(|e| TaskFailure::from_error(&e)) });
        self.supervise(handle, worker, timeout, self.timeout_policy);

        Ok(Submission::accepted(handle))
    }

    /// Validate the timeout and record the SUBMITTED entry under a new handle
    async fn accept(&self, timeout: Duration) -> EngineResult<TaskHandle> {
        if timeout.is_zero() {
            return Err(EngineError::InvalidTimeout(timeout));
        }

        let handle = TaskHandle::generate();
        self.cache.put(handle, CachedResponse::Submitted).await?;

        log_task_operation(
            &self.operation,
            &handle,
            TaskStatus::Submitted,
            Some(&format!("timeout={timeout:?}")),
        );
        Ok(handle)
    }

    fn supervise(
        &self,
        handle: TaskHandle,
        worker: JoinHandle<Result<T, TaskFailure>>,
        timeout: Duration,
        timeout_policy: TimeoutPolicy,
    ) {
        let cache = Arc::clone(&self.cache);
        let operation = Arc::clone(&self.operation);

        tokio::spawn(async move {
            let response = await_outcome(&operation, handle, worker, timeout, timeout_policy).await;
            let status = response.status();

            match cache.put(handle, response).await {
                Ok(()) => log_task_operation(&operation, &handle, status, None),
                Err(e) => error!(
                    operation = %operation,
                    task_id = %handle,
                    status = %status,
                    error = %e,
                    "Failed to record terminal task outcome"
                ),
            }
        });
    }
}

/// Wait on the worker and convert whatever happened into a terminal entry
async fn await_outcome<T>(
    operation: &str,
    handle: TaskHandle,
    mut worker: JoinHandle<Result<T, TaskFailure>>,
    timeout: Duration,
    timeout_policy: TimeoutPolicy,
) -> CachedResponse<T> {
    match tokio::time::timeout(timeout, &mut worker).await {
        Ok(Ok(Ok(value))) => {
            debug!(operation = %operation, task_id = %handle, "Task completed");
            CachedResponse::Complete(value)
        }
        Ok(Ok(Err(failure))) => {
            error!(
                operation = %operation,
                task_id = %handle,
                error_type = %failure.error_type,
                error_message = %failure.error_message,
                "Task failed"
            );
            CachedResponse::Error(failure)
        }
        Ok(Err(join_error)) => {
            CachedResponse::Error(failure_from_join(operation, handle, join_error))
        }
        Err(_elapsed) => {
            if timeout_policy == TimeoutPolicy::Abort {
                worker.abort();
            }
            warn!(
                operation = %operation,
                task_id = %handle,
                timeout_ms = timeout.as_millis() as u64,
                policy = ?timeout_policy,
                "Task timed out"
            );
            CachedResponse::TimedOut(TaskFailure::timeout(timeout))
        }
    }
}

fn failure_from_join(operation: &str, handle: TaskHandle, join_error: JoinError) -> TaskFailure {
    if join_error.is_panic() {
        let failure = TaskFailure::panic(&*join_error.into_panic());
        error!(
            operation = %operation,
            task_id = %handle,
            error_message = %failure.error_message,
            "Task panicked"
        );
        failure
    } else {
        warn!(
            operation = %operation,
            task_id = %handle,
            "Task worker cancelled before completion"
        );
        TaskFailure::cancelled(join_error.to_string())
    }
}
