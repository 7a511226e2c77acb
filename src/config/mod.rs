//! # Configuration System
//!
//! Layered configuration for the engine, the result cache, and the HTTP
//! server. Sources are merged in order, later sources winning:
//!
//! 1. built-in defaults ([`LongCallConfig::default`])
//! 2. `config/longcall.toml`
//! 3. `config/longcall.<env>.toml`, where `<env>` comes from `LONGCALL_ENV`
//! 4. environment variables such as `LONGCALL__CACHE__SCOPE=shared`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use longcall::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let timeout = manager.config().engine.default_timeout();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{
    DEFAULT_IDLE_EXPIRY, DEFAULT_MAX_BLOCKING_THREADS, DEFAULT_TASK_TIMEOUT, MAX_IDLE_EXPIRY,
};
use crate::engine::TimeoutPolicy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LongCallConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Result cache backend selection
    #[serde(default)]
    pub cache: CacheConfig,

    /// Database connection settings for the shared cache
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Task engine behavior
    #[serde(default)]
    pub engine: EngineConfig,

    /// Worker runtime sizing
    #[serde(default)]
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Upper bound on cache access while answering a single request
    pub request_timeout_ms: u64,
    /// How long the demo long-running operation sleeps before answering
    pub demo_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_ms: 5_000,
            demo_delay_ms: 9_000,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn demo_delay(&self) -> Duration {
        Duration::from_millis(self.demo_delay_ms)
    }
}

/// Which result cache backend is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "String", rename_all = "kebab-case")]
pub enum CacheScope {
    /// Moka map inside this process
    #[default]
    InProcess,
    /// PostgreSQL table shared by every instance
    Shared,
}

impl FromStr for CacheScope {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in-process" | "in_process" | "memory" | "in-memory" => Ok(Self::InProcess),
            "shared" | "postgres" | "database" => Ok(Self::Shared),
            other => Err(ConfigurationError::UnknownCacheScope(other.to_string())),
        }
    }
}

impl TryFrom<String> for CacheScope {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub scope: CacheScope,
    /// In-process entries idle this long are evicted
    pub idle_expiry_minutes: u64,
    /// Optional bound on in-process entries
    pub max_capacity: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            scope: CacheScope::InProcess,
            idle_expiry_minutes: DEFAULT_IDLE_EXPIRY.as_secs() / 60,
            max_capacity: None,
        }
    }
}

impl CacheConfig {
    /// Idle interval as a duration; saturates instead of overflowing
    pub fn idle_expiry(&self) -> Duration {
        Duration::from_secs(self.idle_expiry_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bounded wait applied when a caller supplies no timeout
    pub default_timeout_seconds: u64,
    pub timeout_policy: TimeoutPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: DEFAULT_TASK_TIMEOUT.as_secs(),
            timeout_policy: TimeoutPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Ceiling on blocking worker threads for the server runtime
    pub max_blocking_threads: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_blocking_threads: DEFAULT_MAX_BLOCKING_THREADS,
        }
    }
}

impl LongCallConfig {
    /// Validate the configuration, rejecting values the runtime cannot use
    pub fn validate(&self) -> ConfigResult<()> {
        self.server
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| {
                ConfigurationError::validation_error(format!(
                    "server.bind_address '{}' is not a socket address: {e}",
                    self.server.bind_address
                ))
            })?;

        let positive = [
            ("server.request_timeout_ms", self.server.request_timeout_ms),
            ("cache.idle_expiry_minutes", self.cache.idle_expiry_minutes),
            (
                "engine.default_timeout_seconds",
                self.engine.default_timeout_seconds,
            ),
            (
                "worker.max_blocking_threads",
                self.worker.max_blocking_threads as u64,
            ),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigurationError::validation_error(format!(
                    "{field} must be greater than zero"
                )));
            }
        }

        if self.cache.idle_expiry() > MAX_IDLE_EXPIRY {
            return Err(ConfigurationError::validation_error(format!(
                "cache.idle_expiry_minutes must be at most {}",
                MAX_IDLE_EXPIRY.as_secs() / 60
            )));
        }

        if self.cache.max_capacity == Some(0) {
            return Err(ConfigurationError::validation_error(
                "cache.max_capacity must be greater than zero when set",
            ));
        }

        if self.cache.scope == CacheScope::Shared {
            if self.database.url.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigurationError::validation_error(
                    "cache.scope 'shared' requires database.url",
                ));
            }
            if self.database.max_connections == 0 {
                return Err(ConfigurationError::validation_error(
                    "database.max_connections must be greater than zero",
                ));
            }
            if self.database.acquire_timeout_seconds == 0 {
                return Err(ConfigurationError::validation_error(
                    "database.acquire_timeout_seconds must be greater than zero",
                ));
            }
        }

        Ok(())
    }
}
