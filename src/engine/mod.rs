//! # Task Execution Engine
//!
//! Hands callers a handle immediately, runs their work in the background with
//! a bounded wait, and resolves polls against the result cache.
//!
//! ```rust,no_run
//! use longcall::cache::InProcessResponseCache;
//! use longcall::engine::TaskEngine;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(InProcessResponseCache::<String>::default());
//! let engine = TaskEngine::new("report", cache);
//!
//! let submission = engine
//!     .submit(|| Ok::<_, std::io::Error>("ready".to_string()), Duration::from_secs(10))
//!     .await?;
//! let outcome = engine.poll_handle(submission.handle).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod poll;

pub use error::{EngineError, EngineResult};
pub use executor::{TaskEngine, TimeoutPolicy};
