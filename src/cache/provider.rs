//! Result cache provider
//!
//! Uses enum dispatch for zero-cost abstraction over the configured backend.
//! Exactly one backend is active per provider; which one is decided at
//! startup from `cache.scope`.

use super::errors::CacheResult;
use super::providers::InProcessResponseCache;
use super::traits::ResponseCache;
use crate::config::{CacheScope, LongCallConfig};
use crate::task::{CachedResponse, TaskHandle, TaskStatus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

#[cfg(feature = "postgres")]
use super::providers::SharedResponseCache;

/// Result cache selected by configuration
///
/// ## Backends
///
/// - **InProcess**: Moka map with idle expiry, for single-instance deployments
/// - **Shared**: PostgreSQL table, for horizontally scaled deployments
#[derive(Debug, Clone)]
pub enum CacheProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// In-process cache (boxed to keep the enum small)
    InProcess(Box<InProcessResponseCache<T>>),

    /// Shared PostgreSQL cache
    #[cfg(feature = "postgres")]
    Shared(Box<SharedResponseCache<T>>),
}

impl<T> CacheProvider<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a cache provider from configuration
    ///
    /// The shared backend is connected and its schema ensured before the
    /// provider is returned, so a misconfigured database fails startup
    /// rather than the first submission.
    pub async fn from_config(config: &LongCallConfig) -> CacheResult<Self> {
        match config.cache.scope {
            CacheScope::InProcess => Ok(Self::in_process(
                config.cache.idle_expiry(),
                config.cache.max_capacity,
            )),
            CacheScope::Shared => Self::create_shared_backend(config).await,
        }
    }

    /// Create an in-process provider
    pub fn in_process(idle_expiry: Duration, max_capacity: Option<u64>) -> Self {
        let cache = InProcessResponseCache::new(idle_expiry, max_capacity);
        info!(
            backend = "in-process",
            idle_expiry_seconds = idle_expiry.as_secs(),
            "Response cache provider initialized"
        );
        Self::InProcess(Box::new(cache))
    }

    #[cfg(feature = "postgres")]
    async fn create_shared_backend(config: &LongCallConfig) -> CacheResult<Self> {
        let cache = SharedResponseCache::connect(&config.database).await?;
        cache.ensure_schema().await?;
        info!(backend = "shared", "Response cache provider initialized");
        Ok(Self::Shared(Box::new(cache)))
    }

    /// Fallback when the postgres feature is not enabled
    #[cfg(not(feature = "postgres"))]
    async fn create_shared_backend(_config: &LongCallConfig) -> CacheResult<Self> {
        Err(super::errors::CacheError::BackendError(
            "shared cache requested but 'postgres' feature not enabled".to_string(),
        ))
    }

    /// Check if this provider is visible to other processes
    pub fn is_distributed(&self) -> bool {
        match self {
            Self::InProcess(_) => false,
            #[cfg(feature = "postgres")]
            Self::Shared(_) => true,
        }
    }
}

impl<T> ResponseCache<T> for CacheProvider<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn put(&self, handle: TaskHandle, response: CachedResponse<T>) -> CacheResult<()> {
        match self {
            Self::InProcess(c) => c.put(handle, response).await,
            #[cfg(feature = "postgres")]
            Self::Shared(c) => c.put(handle, response).await,
        }
    }

    async fn get(&self, handle: TaskHandle) -> CacheResult<Option<CachedResponse<T>>> {
        match self {
            Self::InProcess(c) => c.get(handle).await,
            #[cfg(feature = "postgres")]
            Self::Shared(c) => c.get(handle).await,
        }
    }

    async fn remove(&self, handle: TaskHandle) -> CacheResult<Option<CachedResponse<T>>> {
        match self {
            Self::InProcess(c) => c.remove(handle).await,
            #[cfg(feature = "postgres")]
            Self::Shared(c) => c.remove(handle).await,
        }
    }

    async fn replace_if_status(
        &self,
        handle: TaskHandle,
        expected: TaskStatus,
        replacement: CachedResponse<T>,
    ) -> CacheResult<bool> {
        match self {
            Self::InProcess(c) => c.replace_if_status(handle, expected, replacement).await,
            #[cfg(feature = "postgres")]
            Self::Shared(c) => c.replace_if_status(handle, expected, replacement).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match self {
            Self::InProcess(c) => c.health_check().await,
            #[cfg(feature = "postgres")]
            Self::Shared(c) => c.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Self::InProcess(c) => c.provider_name(),
            #[cfg(feature = "postgres")]
            Self::Shared(c) => c.provider_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;

    #[tokio::test]
    async fn test_default_config_selects_in_process() {
        let config = LongCallConfig::default();
        let provider: CacheProvider<Vec<String>> =
            CacheProvider::from_config(&config).await.unwrap();
        assert_eq!(provider.provider_name(), "in-process");
        assert!(!provider.is_distributed());
        assert!(provider.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_huge_idle_expiry_does_not_overflow() {
        let mut config = LongCallConfig::default();
        config.cache.idle_expiry_minutes = u64::MAX;

        let provider: CacheProvider<Vec<String>> =
            CacheProvider::from_config(&config).await.unwrap();
        assert_eq!(provider.provider_name(), "in-process");
    }

    #[tokio::test]
    async fn test_provider_dispatches_to_backend() {
        let provider: CacheProvider<Vec<String>> =
            CacheProvider::in_process(Duration::from_secs(60), None);
        let handle = TaskHandle::generate();

        provider.put(handle, CachedResponse::Submitted).await.unwrap();
        assert!(provider
            .replace_if_status(handle, TaskStatus::Submitted, CachedResponse::Pending)
            .await
            .unwrap());
        assert_eq!(
            provider.remove(handle).await.unwrap(),
            Some(CachedResponse::Pending)
        );
        assert!(provider.get(handle).await.unwrap().is_none());
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn test_shared_scope_without_url_fails() {
        let mut config = LongCallConfig::default();
        config.cache.scope = CacheScope::Shared;
        config.database.url = None;

        let result: CacheResult<CacheProvider<Vec<String>>> =
            CacheProvider::from_config(&config).await;
        assert!(matches!(result, Err(CacheError::ConnectionError(_))));
    }
}
