//! Configuration Loader
//!
//! Environment-aware loading: TOML file discovery, environment detection,
//! and merging of environment variable overrides.

use super::error::ConfigResult;
use super::LongCallConfig;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable selecting the environment-specific overlay
pub const ENVIRONMENT_VAR: &str = "LONGCALL_ENV";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_VAR: &str = "LONGCALL_CONFIG_DIR";

/// Prefix for per-field overrides, e.g. `LONGCALL__ENGINE__DEFAULT_TIMEOUT_SECONDS`
pub const ENV_OVERRIDE_PREFIX: &str = "LONGCALL";

const FILE_STEM: &str = "longcall";

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: LongCallConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    ///
    /// Useful for testing without modifying global environment variables.
    /// Missing files are skipped; the built-in defaults always apply.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = environment,
            bind_address = %config.server.bind_address,
            cache_scope = ?config.cache.scope,
            default_timeout_seconds = config.engine.default_timeout_seconds,
            timeout_policy = ?config.engine.timeout_policy,
            max_blocking_threads = config.worker.max_blocking_threads,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration after validating it
    pub fn from_config(config: LongCallConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: Self::detect_environment(),
            config_directory: Self::default_config_directory(),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &LongCallConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect the current environment, defaulting to `development`
    pub fn detect_environment() -> String {
        env::var(ENVIRONMENT_VAR)
            .ok()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var(CONFIG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<LongCallConfig> {
        let base_file = config_directory.join(format!("{FILE_STEM}.toml"));
        let env_file = config_directory.join(format!("{FILE_STEM}.{environment}.toml"));

        debug!(
            base_present = base_file.is_file(),
            environment_present = env_file.is_file(),
            "Configuration file discovery"
        );

        let defaults = config::Config::try_from(&LongCallConfig::default())?;

        let merged = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(base_file).required(false))
            .add_source(config::File::from(env_file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_OVERRIDE_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(merged.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheScope, ConfigurationError};
    use crate::engine::TimeoutPolicy;
    use std::time::Duration;

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().join("absent")), "test")
                .unwrap();
        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config().cache.scope, CacheScope::InProcess);
        assert_eq!(manager.config().engine.default_timeout_seconds, 10);
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("longcall.toml"),
            r#"
            [engine]
            default_timeout_seconds = 30

            [server]
            demo_delay_ms = 250
            "#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("longcall.staging.toml"),
            r#"
            [engine]
            default_timeout_seconds = 45
            timeout_policy = "abort"

            [cache]
            idle_expiry_minutes = 5
            "#,
        )
        .unwrap();

        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "staging")
                .unwrap();
        let config = manager.config();
        assert_eq!(config.engine.default_timeout(), Duration::from_secs(45));
        assert_eq!(config.engine.timeout_policy, TimeoutPolicy::Abort);
        assert_eq!(config.server.demo_delay(), Duration::from_millis(250));
        assert_eq!(config.cache.idle_expiry_minutes, 5);
        assert_eq!(config.worker.max_blocking_threads, 512);
    }

    #[test]
    fn test_unknown_scope_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("longcall.toml"),
            "[cache]\nscope = \"redis\"\n",
        )
        .unwrap();

        let err =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap_err();
        assert!(matches!(err, ConfigurationError::LoadError(_)));
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("longcall.toml"),
            "[cache]\nscope = \"shared\"\n",
        )
        .unwrap();

        let err =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap_err();
        assert!(matches!(err, ConfigurationError::ValidationError { .. }));
    }
}
