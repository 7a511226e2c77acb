//! HTTP renderings of submissions and poll outcomes
//!
//! Every response carries `Task-Status`; submissions add `Task-Id`, failures
//! add `Task-Error-Type` and `Task-Error-Message`, and only a completed poll
//! carries a JSON body.

use crate::constants::headers;
use crate::task::{PollOutcome, Submission, TaskFailure, TaskStatus};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

impl IntoResponse for Submission {
    fn into_response(self) -> Response {
        let mut header_map = status_headers(self.status);
        insert_header(&mut header_map, headers::TASK_ID, &self.handle.to_string());
        (http_status(self.status), header_map).into_response()
    }
}

impl<T> IntoResponse for PollOutcome<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = self.status();
        let mut header_map = status_headers(status);

        match self {
            PollOutcome::Complete(body) => {
                (http_status(status), header_map, Json(body)).into_response()
            }
            PollOutcome::Error(failure) | PollOutcome::TimedOut(failure) => {
                insert_failure_headers(&mut header_map, &failure);
                (http_status(status), header_map).into_response()
            }
            PollOutcome::Pending | PollOutcome::Unsubmitted => {
                (http_status(status), header_map).into_response()
            }
        }
    }
}

fn http_status(status: TaskStatus) -> StatusCode {
    StatusCode::from_u16(status.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn status_headers(status: TaskStatus) -> HeaderMap {
    let mut header_map = HeaderMap::new();
    insert_header(&mut header_map, headers::TASK_STATUS, status.as_str());
    header_map
}

fn insert_failure_headers(header_map: &mut HeaderMap, failure: &TaskFailure) {
    insert_header(header_map, headers::TASK_ERROR_TYPE, &failure.error_type);
    insert_header(header_map, headers::TASK_ERROR_MESSAGE, &failure.error_message);
}

fn insert_header(header_map: &mut HeaderMap, name: &str, value: &str) {
    // HeaderName::from_bytes lowercases the canonical spelling
    if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
        header_map.insert(name, header_value(value));
    }
}

/// Build a header value, replacing control characters that HTTP forbids
fn header_value(value: &str) -> HeaderValue {
    let sanitized: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_bytes(sanitized.trim().as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("None"))
}
