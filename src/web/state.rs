//! # Web API Application State
//!
//! Shared state handed to every handler: the engine running the demo
//! long-running operation plus the request-level settings it needs.

use crate::cache::CacheProvider;
use crate::config::LongCallConfig;
use crate::engine::TaskEngine;
use std::sync::Arc;
use std::time::Duration;

/// Result produced by the demo long-running operation
pub type DemoResult = Vec<String>;

/// Engine type served by the HTTP adapter
pub type LongCallEngine = TaskEngine<DemoResult, CacheProvider<DemoResult>>;

/// Request-level settings derived from configuration
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Timeout used when a submit request names none
    pub default_task_timeout: Duration,
    /// Bound on cache access while answering one request
    pub request_timeout: Duration,
    /// How long the demo operation takes
    pub demo_delay: Duration,
}

impl From<&LongCallConfig> for WebConfig {
    fn from(config: &LongCallConfig) -> Self {
        Self {
            default_task_timeout: config.engine.default_timeout(),
            request_timeout: config.server.request_timeout(),
            demo_delay: config.server.demo_delay(),
        }
    }
}

/// Shared application state for the web API
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<LongCallEngine>,
    pub config: Arc<WebConfig>,
}

impl AppState {
    pub fn new(engine: LongCallEngine, config: WebConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        }
    }

    /// Build state from loaded configuration and an already-created cache
    pub fn from_config(config: &LongCallConfig, cache: CacheProvider<DemoResult>) -> Self {
        let engine = TaskEngine::new("long-call", Arc::new(cache))
            .with_timeout_policy(config.engine.timeout_policy);
        Self::new(engine, WebConfig::from(config))
    }

    /// Create the configured cache backend and build state around it
    pub async fn bootstrap(config: &LongCallConfig) -> crate::Result<Self> {
        let cache = CacheProvider::from_config(config).await?;
        Ok(Self::from_config(config, cache))
    }
}
