//! Task status definitions and the response shapes stored in and returned
//! from the result cache.

use crate::constants::{error_types, EMPTY_ERROR_MESSAGE};
use crate::task::TaskHandle;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::time::Duration;

/// Caller-visible task status, carried in the `Task-Status` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted for execution, not yet polled
    Submitted,
    /// Polled at least once while still running
    Pending,
    /// Finished and produced a result
    Complete,
    /// Failed, panicked, or was cancelled
    Error,
    /// Did not finish within its bounded wait
    TimedOut,
    /// No entry exists for the handle. Never stored.
    Unsubmitted,
}

impl TaskStatus {
    /// Terminal statuses are observable exactly once before consumption
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::TimedOut)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error | Self::TimedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::TimedOut => "timedout",
            Self::Unsubmitted => "unsubmitted",
        }
    }

    /// HTTP status code the adapter answers with for this status
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Submitted => 202,
            Self::Pending | Self::Complete => 200,
            Self::Unsubmitted => 400,
            Self::Error | Self::TimedOut => 500,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "pending" => Ok(Self::Pending),
            "complete" => Ok(Self::Complete),
            "error" => Ok(Self::Error),
            "timedout" => Ok(Self::TimedOut),
            "unsubmitted" => Ok(Self::Unsubmitted),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

/// Category and message describing why a task did not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub error_type: String,
    pub error_message: String,
}

impl TaskFailure {
    /// Build a failure, substituting placeholders for empty fields
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        let error_type = error_type.into();
        let error_message = error_message.into();
        Self {
            error_type: if error_type.trim().is_empty() {
                error_types::UNKNOWN.to_string()
            } else {
                error_type
            },
            error_message: if error_message.trim().is_empty() {
                EMPTY_ERROR_MESSAGE.to_string()
            } else {
                error_message
            },
        }
    }

    /// Failure raised by the work itself; the category is the error's type name
    pub fn from_error<E: fmt::Display>(error: &E) -> Self {
        Self::new(std::any::type_name::<E>(), error.to_string())
    }

    /// Bounded wait elapsed before the work finished
    pub fn timeout(waited: Duration) -> Self {
        Self::new(
            std::any::type_name::<tokio::time::error::Elapsed>(),
            format!("Task did not complete within {waited:?}"),
        )
    }

    /// Work panicked; the payload is rendered when it is a string
    pub fn panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        Self::new(error_types::PANIC, message)
    }

    /// Worker was cancelled before the work finished
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::new(error_types::CANCELLED, reason)
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.error_message)
    }
}

/// The unit stored in the result cache for one handle
///
/// A body exists only on `Complete` and failure metadata only on `Error` and
/// `TimedOut`; the variants make any other combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CachedResponse<T> {
    Submitted,
    Pending,
    Complete(T),
    Error(TaskFailure),
    TimedOut(TaskFailure),
}

impl<T> CachedResponse<T> {
    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Submitted => TaskStatus::Submitted,
            Self::Pending => TaskStatus::Pending,
            Self::Complete(_) => TaskStatus::Complete,
            Self::Error(_) => TaskStatus::Error,
            Self::TimedOut(_) => TaskStatus::TimedOut,
        }
    }

    pub fn body(&self) -> Option<&T> {
        match self {
            Self::Complete(body) => Some(body),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Self::Error(failure) | Self::TimedOut(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

/// What a poll reports to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PollOutcome<T> {
    Unsubmitted,
    Pending,
    Complete(T),
    Error(TaskFailure),
    TimedOut(TaskFailure),
}

impl<T> PollOutcome<T> {
    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Unsubmitted => TaskStatus::Unsubmitted,
            Self::Pending => TaskStatus::Pending,
            Self::Complete(_) => TaskStatus::Complete,
            Self::Error(_) => TaskStatus::Error,
            Self::TimedOut(_) => TaskStatus::TimedOut,
        }
    }

    pub fn body(&self) -> Option<&T> {
        match self {
            Self::Complete(body) => Some(body),
            _ => None,
        }
    }

    pub fn into_body(self) -> Option<T> {
        match self {
            Self::Complete(body) => Some(body),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Self::Error(failure) | Self::TimedOut(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn http_status_code(&self) -> u16 {
        self.status().http_status_code()
    }
}

/// Terminal cache entries become the outcome reported by the consuming poll
impl<T> From<CachedResponse<T>> for PollOutcome<T> {
    fn from(response: CachedResponse<T>) -> Self {
        match response {
            CachedResponse::Submitted | CachedResponse::Pending => Self::Pending,
            CachedResponse::Complete(body) => Self::Complete(body),
            CachedResponse::Error(failure) => Self::Error(failure),
            CachedResponse::TimedOut(failure) => Self::TimedOut(failure),
        }
    }
}

/// Acknowledgement returned immediately by `submit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub handle: TaskHandle,
    pub status: TaskStatus,
}

impl Submission {
    pub fn accepted(handle: TaskHandle) -> Self {
        Self {
            handle,
            status: TaskStatus::Submitted,
        }
    }

    pub fn http_status_code(&self) -> u16 {
        self.status.http_status_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(TaskStatus::Complete.is_terminal());
        assert!(TaskStatus::Error.is_terminal());
        assert!(TaskStatus::TimedOut.is_terminal());
        assert!(!TaskStatus::Submitted.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Unsubmitted.is_terminal());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(TaskStatus::TimedOut.to_string(), "timedout");
        assert_eq!(
            "unsubmitted".parse::<TaskStatus>().unwrap(),
            TaskStatus::Unsubmitted
        );
        assert!("finished".parse::<TaskStatus>().is_err());

        let json = serde_json::to_string(&TaskStatus::TimedOut).unwrap();
        assert_eq!(json, "\"timedout\"");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(TaskStatus::Submitted.http_status_code(), 202);
        assert_eq!(TaskStatus::Pending.http_status_code(), 200);
        assert_eq!(TaskStatus::Complete.http_status_code(), 200);
        assert_eq!(TaskStatus::Unsubmitted.http_status_code(), 400);
        assert_eq!(TaskStatus::Error.http_status_code(), 500);
        assert_eq!(TaskStatus::TimedOut.http_status_code(), 500);
    }

    #[test]
    fn test_failure_placeholders() {
        let failure = TaskFailure::new("", "  ");
        assert_eq!(failure.error_type, "Unknown");
        assert_eq!(failure.error_message, "None");
    }

    #[test]
    fn test_failure_from_error_uses_type_name() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let failure = TaskFailure::from_error(&err);
        assert!(failure.error_type.contains("io"));
        assert_eq!(failure.error_message, "disk on fire");
    }

    #[test]
    fn test_failure_from_panic_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(TaskFailure::panic(payload.as_ref()).error_message, "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(TaskFailure::panic(payload.as_ref()).error_message, "owned boom");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        let failure = TaskFailure::panic(payload.as_ref());
        assert_eq!(failure.error_type, "panic");
        assert_eq!(failure.error_message, "None");
    }

    #[test]
    fn test_timeout_failure_is_populated() {
        let failure = TaskFailure::timeout(Duration::from_secs(2));
        assert!(failure.error_type.contains("Elapsed"));
        assert!(failure.error_message.contains("2s"));
    }

    #[test]
    fn test_cached_response_accessors() {
        let complete: CachedResponse<Vec<u8>> = CachedResponse::Complete(vec![1, 2, 3]);
        assert_eq!(complete.status(), TaskStatus::Complete);
        assert_eq!(complete.body(), Some(&vec![1, 2, 3]));
        assert!(complete.failure().is_none());

        let failed: CachedResponse<Vec<u8>> =
            CachedResponse::TimedOut(TaskFailure::new("timeout", "too slow"));
        assert!(failed.body().is_none());
        assert_eq!(failed.failure().unwrap().error_message, "too slow");
        assert!(failed.is_terminal());
        assert!(!CachedResponse::<Vec<u8>>::Pending.is_terminal());
    }

    #[test]
    fn test_poll_outcome_from_terminal_entry() {
        let outcome: PollOutcome<String> =
            CachedResponse::Error(TaskFailure::new("E", "m")).into();
        assert_eq!(outcome.status(), TaskStatus::Error);
        assert_eq!(outcome.http_status_code(), 500);

        let outcome: PollOutcome<String> = CachedResponse::Complete("done".to_string()).into();
        assert_eq!(outcome.into_body().as_deref(), Some("done"));
    }

    #[test]
    fn test_submission_is_accepted() {
        let submission = Submission::accepted(TaskHandle::generate());
        assert_eq!(submission.status, TaskStatus::Submitted);
        assert_eq!(submission.http_status_code(), 202);
    }
}
