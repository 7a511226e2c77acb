//! Crate-level error type for bootstrapping and embedding

use crate::cache::CacheError;
use crate::config::ConfigurationError;
use crate::engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LongCallError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, LongCallError>;
