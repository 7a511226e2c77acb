//! In-process result cache using Moka
//!
//! Entries are evicted once they have been neither read nor written for the
//! configured idle interval. State is lost on restart and is not visible to
//! other processes; use the shared provider for multi-instance deployments.
//!
//! Every write goes through moka's per-key `and_compute_with` lock. A plain
//! `insert` does not take that lock, so mixing the two would let a
//! compare-and-set overwrite a terminal entry written between its read and
//! its write.

use crate::cache::errors::CacheResult;
use crate::cache::traits::ResponseCache;
use crate::constants::{DEFAULT_IDLE_EXPIRY, MAX_IDLE_EXPIRY};
use crate::task::{CachedResponse, TaskHandle, TaskStatus};
use moka::ops::compute::{CompResult, Op};
use std::time::Duration;
use tracing::debug;

/// In-memory response cache with idle expiry
#[derive(Clone)]
pub struct InProcessResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    cache: moka::future::Cache<TaskHandle, CachedResponse<T>>,
    idle_expiry: Duration,
}

impl<T> std::fmt::Debug for InProcessResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessResponseCache")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entry_count", &self.cache.entry_count())
            .field("idle_expiry", &self.idle_expiry)
            .finish()
    }
}

impl<T> Default for InProcessResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_EXPIRY, None)
    }
}

impl<T> InProcessResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a cache that evicts entries idle for longer than `idle_expiry`
    ///
    /// `max_capacity` bounds the entry count; `None` leaves it unbounded so
    /// that only idle expiry and consumption remove entries. Intervals above
    /// [`MAX_IDLE_EXPIRY`] are clamped to it.
    pub fn new(idle_expiry: Duration, max_capacity: Option<u64>) -> Self {
        let idle_expiry = idle_expiry.min(MAX_IDLE_EXPIRY);
        let mut builder = moka::future::Cache::builder().time_to_idle(idle_expiry);
        if let Some(capacity) = max_capacity {
            builder = builder.max_capacity(capacity);
        }
        let cache = builder.build();

        debug!(
            idle_expiry_seconds = idle_expiry.as_secs(),
            max_capacity = ?max_capacity,
            "In-process response cache created"
        );

        Self { cache, idle_expiry }
    }

    /// Number of entries currently held (approximate until maintenance runs)
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Run pending eviction and expiry work immediately
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl<T> ResponseCache<T> for InProcessResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn put(&self, handle: TaskHandle, response: CachedResponse<T>) -> CacheResult<()> {
        let status = response.status();
        self.cache
            .entry(handle)
            .and_compute_with(|_| std::future::ready(Op::Put(response)))
            .await;
        debug!(handle = %handle, status = %status, "Cache PUT (in-process)");
        Ok(())
    }

    async fn get(&self, handle: TaskHandle) -> CacheResult<Option<CachedResponse<T>>> {
        let result = self.cache.get(&handle).await;

        if result.is_some() {
            debug!(handle = %handle, "Cache HIT (in-process)");
        } else {
            debug!(handle = %handle, "Cache MISS (in-process)");
        }

        Ok(result)
    }

    async fn remove(&self, handle: TaskHandle) -> CacheResult<Option<CachedResponse<T>>> {
        let result = self
            .cache
            .entry(handle)
            .and_compute_with(|existing| {
                std::future::ready(match existing {
                    Some(_) => Op::Remove,
                    None => Op::Nop,
                })
            })
            .await;

        let removed = match result {
            CompResult::Removed(entry) => Some(entry.into_value()),
            _ => None,
        };
        debug!(handle = %handle, removed = removed.is_some(), "Cache DEL (in-process)");
        Ok(removed)
    }

    async fn replace_if_status(
        &self,
        handle: TaskHandle,
        expected: TaskStatus,
        replacement: CachedResponse<T>,
    ) -> CacheResult<bool> {
        let result = self
            .cache
            .entry(handle)
            .and_compute_with(|existing| {
                let op = match existing {
                    Some(entry) if entry.value().status() == expected => Op::Put(replacement),
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        let replaced = matches!(result, CompResult::ReplacedWith(_));
        debug!(
            handle = %handle,
            expected = %expected,
            replaced = replaced,
            "Cache CAS (in-process)"
        );
        Ok(replaced)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "in-process"
    }
}
