//! Web API error type with HTTP status code mappings

use crate::cache::CacheError;
use crate::engine::EngineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Errors a handler can answer with instead of a task response
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid UUID format: {uuid}")]
    InvalidUuid { uuid: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Result cache unavailable: {message}")]
    CacheUnavailable { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUuid { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::CacheUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUuid { .. } => "INVALID_UUID",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::CacheUnavailable { .. } => "CACHE_UNAVAILABLE",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::InvalidUuid { uuid } => uuid.clone(),
            Self::BadRequest { message } | Self::CacheUnavailable { message } => message.clone(),
        };

        let error_response = json!({
            "error": {
                "code": self.error_code(),
                "message": message
            }
        });

        (self.status_code(), Json(error_response)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidHandle(invalid) => Self::InvalidUuid {
                uuid: invalid.input,
            },
            EngineError::InvalidTimeout(_) => Self::bad_request(err.to_string()),
            EngineError::Cache(cache_err) => cache_err.into(),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        warn!(error = %err, "Result cache operation failed");
        Self::cache_unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request(format!("Malformed JSON body: {err}"))
    }
}

/// Result type for web handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskHandle;
    use std::time::Duration;

    #[test]
    fn test_engine_errors_map_to_status_codes() {
        let invalid = "nope".parse::<TaskHandle>().unwrap_err();
        let err: ApiError = EngineError::InvalidHandle(invalid).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_UUID");

        let err: ApiError = EngineError::InvalidTimeout(Duration::ZERO).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError =
            EngineError::Cache(CacheError::ConnectionError("refused".to_string())).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "CACHE_UNAVAILABLE");
    }
}
