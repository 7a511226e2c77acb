//! Result cache trait definition

use super::errors::CacheResult;
use crate::task::{CachedResponse, TaskHandle, TaskStatus};

/// Trait defining result cache operations
///
/// Implemented by the in-process and shared providers. Every operation is
/// keyed by a single handle; implementations must be safe under concurrent
/// calls for different handles and linearizable per handle.
pub trait ResponseCache<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Insert or overwrite the entry for `handle`
    fn put(
        &self,
        handle: TaskHandle,
        response: CachedResponse<T>,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Read the entry for `handle`
    ///
    /// Returns `Ok(None)` when no entry exists.
    fn get(
        &self,
        handle: TaskHandle,
    ) -> impl std::future::Future<Output = CacheResult<Option<CachedResponse<T>>>> + Send;

    /// Remove the entry for `handle`, returning it if this call removed it
    ///
    /// Of several concurrent callers, at most one receives `Some`.
    fn remove(
        &self,
        handle: TaskHandle,
    ) -> impl std::future::Future<Output = CacheResult<Option<CachedResponse<T>>>> + Send;

    /// Overwrite the entry only if its current status is `expected`
    ///
    /// Returns `true` when the replacement was written. The provided
    /// implementation is a read followed by a write; providers override it
    /// with an atomic compare-and-set.
    fn replace_if_status(
        &self,
        handle: TaskHandle,
        expected: TaskStatus,
        replacement: CachedResponse<T>,
    ) -> impl std::future::Future<Output = CacheResult<bool>> + Send {
        async move {
            match self.get(handle).await? {
                Some(current) if current.status() == expected => {
                    self.put(handle, replacement).await?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    /// Check if the cache backend is healthy
    fn health_check(&self) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Get the name of the cache provider
    fn provider_name(&self) -> &'static str;
}
