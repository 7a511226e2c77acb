//! Result cache error types

use thiserror::Error;

/// Errors that can occur during result cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache backend
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Failed to serialize or deserialize a cached body
    #[error("Cache serialization error: {0}")]
    SerializationError(String),

    /// Cache operation timed out
    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    BackendError(String),

    /// A stored entry could not be interpreted as a response
    #[error("Corrupted cache entry for {handle}: {reason}")]
    Corrupted { handle: String, reason: String },
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::SerializationError(err.to_string())
    }
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => CacheError::Timeout(err.to_string()),
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                CacheError::ConnectionError(err.to_string())
            }
            other => CacheError::BackendError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_pool_timeout_maps_to_timeout() {
        let err: CacheError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, CacheError::Timeout(_)));
    }

    #[test]
    fn test_sqlx_pool_closed_maps_to_connection_error() {
        let err: CacheError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, CacheError::ConnectionError(_)));
    }

    #[test]
    fn test_serde_error_maps_to_serialization_error() {
        let json_err = serde_json::from_str::<Vec<String>>("{not json").unwrap_err();
        let err: CacheError = json_err.into();
        assert!(matches!(err, CacheError::SerializationError(_)));
        assert!(err.to_string().starts_with("Cache serialization error"));
    }
}
