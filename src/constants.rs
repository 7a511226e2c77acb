//! # System Constants
//!
//! Header names, persisted-layout limits, and the defaults that the
//! configuration layer falls back to when a value is not supplied.

use std::time::Duration;

/// HTTP header names carried on submit and poll responses
pub mod headers {
    pub const TASK_ID: &str = "Task-Id";
    pub const TASK_STATUS: &str = "Task-Status";
    pub const TASK_ERROR_TYPE: &str = "Task-Error-Type";
    pub const TASK_ERROR_MESSAGE: &str = "Task-Error-Message";
}

/// Error categories recorded when a failure has no concrete error type
pub mod error_types {
    pub const PANIC: &str = "panic";
    pub const CANCELLED: &str = "cancelled";
    pub const UNKNOWN: &str = "Unknown";
}

/// Message recorded when a failure carries no text
pub const EMPTY_ERROR_MESSAGE: &str = "None";

/// Width of the `headers` column in the shared cache table
pub const MAX_ENCODED_HEADERS_LEN: usize = 512;

/// Name of the shared cache table
pub const RESPONSE_CACHE_TABLE: &str = "response_cache";

/// Idle interval after which in-process entries are evicted
pub const DEFAULT_IDLE_EXPIRY: Duration = Duration::from_secs(180 * 60);

/// Longest idle interval the in-process cache accepts (one year)
pub const MAX_IDLE_EXPIRY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Timeout applied by the HTTP adapter when the caller supplies none
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking worker ceiling for the server runtime
pub const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;
