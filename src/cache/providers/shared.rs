//! Shared result cache backed by PostgreSQL
//!
//! One row per handle in `response_cache`. Status and failure metadata live
//! in the bounded `headers` column (see [`header_codec`]), completed bodies
//! are stored as JSON in `body`. Rows persist until a poll consumes them, so
//! any instance sharing the database can answer for any handle.
//!
//! [`header_codec`]: crate::cache::header_codec

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::header_codec;
use crate::cache::traits::ResponseCache;
use crate::config::DatabaseConfig;
use crate::task::{CachedResponse, TaskHandle, TaskStatus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info};

const CREATE_RESPONSE_CACHE_SQL: &str =
    include_str!("../../../migrations/20240601000000_create_response_cache.sql");

/// Persisted response cache shared by every instance using the same database
pub struct SharedResponseCache<T> {
    pool: PgPool,
    _body: PhantomData<fn() -> T>,
}

impl<T> Clone for SharedResponseCache<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _body: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for SharedResponseCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedResponseCache")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl<T> SharedResponseCache<T> {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _body: PhantomData,
        }
    }

    /// Open a pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> CacheResult<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            CacheError::ConnectionError("no database url configured for shared cache".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(url)
            .await
            .map_err(|e| CacheError::ConnectionError(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Shared response cache connected"
        );
        Ok(Self::new(pool))
    }

    /// Create the `response_cache` table if it does not exist
    pub async fn ensure_schema(&self) -> CacheResult<()> {
        sqlx::raw_sql(CREATE_RESPONSE_CACHE_SQL)
            .execute(&self.pool)
            .await?;
        debug!("Shared response cache schema ensured");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl<T> SharedResponseCache<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode_row(response: &CachedResponse<T>) -> CacheResult<(String, Option<String>)> {
        let headers = header_codec::encode(response.status(), response.failure());
        let body = response.body().map(serde_json::to_string).transpose()?;
        Ok((headers, body))
    }

    fn decode_row(
        handle: TaskHandle,
        headers: &str,
        body: Option<String>,
    ) -> CacheResult<Option<CachedResponse<T>>> {
        if headers.trim().is_empty() {
            return Ok(None);
        }

        let key = handle.to_string();
        let decoded = header_codec::decode(headers, &key)?;
        let corrupted = |reason: &str| CacheError::Corrupted {
            handle: key.clone(),
            reason: reason.to_string(),
        };

        let response = match decoded.status {
            TaskStatus::Submitted => CachedResponse::Submitted,
            TaskStatus::Pending => CachedResponse::Pending,
            TaskStatus::Complete => {
                let body = body.ok_or_else(|| corrupted("complete entry without a body"))?;
                CachedResponse::Complete(serde_json::from_str(&body)?)
            }
            TaskStatus::Error => CachedResponse::Error(
                decoded
                    .failure
                    .ok_or_else(|| corrupted("error entry without metadata"))?,
            ),
            TaskStatus::TimedOut => CachedResponse::TimedOut(
                decoded
                    .failure
                    .ok_or_else(|| corrupted("timed out entry without metadata"))?,
            ),
            TaskStatus::Unsubmitted => return Err(corrupted("unsubmitted is never stored")),
        };

        Ok(Some(response))
    }
}

impl<T> ResponseCache<T> for SharedResponseCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn put(&self, handle: TaskHandle, response: CachedResponse<T>) -> CacheResult<()> {
        let (headers, body) = Self::encode_row(&response)?;

        sqlx::query(
            r#"
            INSERT INTO response_cache (task_uuid, headers, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (task_uuid)
            DO UPDATE SET headers = EXCLUDED.headers, body = EXCLUDED.body
            "#,
        )
        .bind(handle.to_string())
        .bind(&headers)
        .bind(body)
        .execute(&self.pool)
        .await?;

        debug!(handle = %handle, headers = %headers, "Cache PUT (shared)");
        Ok(())
    }

    async fn get(&self, handle: TaskHandle) -> CacheResult<Option<CachedResponse<T>>> {
        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT headers, body FROM response_cache WHERE task_uuid = $1")
                .bind(handle.to_string())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((headers, body)) => {
                debug!(handle = %handle, "Cache HIT (shared)");
                Self::decode_row(handle, &headers, body)
            }
            None => {
                debug!(handle = %handle, "Cache MISS (shared)");
                Ok(None)
            }
        }
    }

    async fn remove(&self, handle: TaskHandle) -> CacheResult<Option<CachedResponse<T>>> {
        let row: Option<(String, Option<String>)> = sqlx::query_as(
            "DELETE FROM response_cache WHERE task_uuid = $1 RETURNING headers, body",
        )
        .bind(handle.to_string())
        .fetch_optional(&self.pool)
        .await?;

        debug!(handle = %handle, removed = row.is_some(), "Cache DEL (shared)");
        match row {
            Some((headers, body)) => Self::decode_row(handle, &headers, body),
            None => Ok(None),
        }
    }

    async fn replace_if_status(
        &self,
        handle: TaskHandle,
        expected: TaskStatus,
        replacement: CachedResponse<T>,
    ) -> CacheResult<bool> {
        let (headers, body) = Self::encode_row(&replacement)?;
        let expected_headers = header_codec::encode(expected, None);

        let result = sqlx::query(
            r#"
            UPDATE response_cache
            SET headers = $2, body = $3
            WHERE task_uuid = $1
              AND (headers = $4 OR headers LIKE $4 || ';%')
            "#,
        )
        .bind(handle.to_string())
        .bind(&headers)
        .bind(body)
        .bind(&expected_headers)
        .execute(&self.pool)
        .await?;

        let replaced = result.rows_affected() == 1;
        debug!(
            handle = %handle,
            expected = %expected,
            replaced = replaced,
            "Cache CAS (shared)"
        );
        Ok(replaced)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(one == 1)
    }

    fn provider_name(&self) -> &'static str {
        "shared"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskFailure;

    type Body = Vec<String>;

    #[test]
    fn test_complete_row_round_trips_body_as_json() {
        let handle = TaskHandle::generate();
        let response: CachedResponse<Body> =
            CachedResponse::Complete(vec!["Hello".to_string(), "Client!".to_string()]);

        let (headers, body) = SharedResponseCache::<Body>::encode_row(&response).unwrap();
        assert_eq!(headers, "Task-Status=complete");
        assert_eq!(body.as_deref(), Some(r#"["Hello","Client!"]"#));

        let decoded = SharedResponseCache::<Body>::decode_row(handle, &headers, body).unwrap();
        assert_eq!(decoded, Some(response));
    }

    #[test]
    fn test_failure_row_has_no_body() {
        let response: CachedResponse<Body> =
            CachedResponse::TimedOut(TaskFailure::timeout(Duration::from_secs(1)));
        let (headers, body) = SharedResponseCache::<Body>::encode_row(&response).unwrap();
        assert!(headers.starts_with("Task-Status=timedout;Task-Error-Type="));
        assert!(body.is_none());
    }

    #[test]
    fn test_empty_headers_read_as_absent() {
        let decoded =
            SharedResponseCache::<Body>::decode_row(TaskHandle::generate(), "", None).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_complete_without_body_is_corrupted() {
        let err = SharedResponseCache::<Body>::decode_row(
            TaskHandle::generate(),
            "Task-Status=complete",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CacheError::Corrupted { .. }));
    }

    #[test]
    fn test_stored_unsubmitted_is_corrupted() {
        let err = SharedResponseCache::<Body>::decode_row(
            TaskHandle::generate(),
            "Task-Status=unsubmitted",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CacheError::Corrupted { .. }));
    }
}
