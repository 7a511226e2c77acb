#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # longcall
//!
//! Submit-now, poll-later execution of long-running operations.
//!
//! ## Overview
//!
//! A caller submits work and immediately receives an opaque task handle. The
//! work runs in the background with a bounded wait while the caller issues
//! cheap polls. Each poll reports PENDING until the outcome is known, then
//! reports COMPLETE, ERROR or TIMEDOUT exactly once before the entry is
//! consumed; afterwards the handle reads as UNSUBMITTED.
//!
//! ## Module Organization
//!
//! - [`task`] - Handles, statuses, and cached response shapes
//! - [`cache`] - `ResponseCache` trait with in-process and shared backends
//! - [`engine`] - Submission, supervised execution, and poll resolution
//! - [`config`] - Layered configuration loading
//! - [`logging`] - Tracing initialization and structured operation logs
//! - [`web`] - Axum HTTP adapter
//! - [`error`] - Crate-level error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use longcall::cache::CacheProvider;
//! use longcall::engine::TaskEngine;
//! use longcall::task::PollOutcome;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = CacheProvider::<Vec<String>>::in_process(Duration::from_secs(600), None);
//! let engine = TaskEngine::new("greeting", Arc::new(cache));
//!
//! let submission = engine
//!     .submit(
//!         || Ok::<_, std::io::Error>(vec!["Hello".to_string(), "Client!".to_string()]),
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//!
//! loop {
//!     match engine.poll_handle(submission.handle).await? {
//!         PollOutcome::Pending => tokio::time::sleep(Duration::from_millis(100)).await,
//!         outcome => {
//!             println!("{:?}", outcome.status());
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod logging;
pub mod task;
pub mod web;

pub use cache::{CacheError, CacheProvider, ResponseCache};
pub use config::{ConfigManager, LongCallConfig};
pub use engine::{EngineError, TaskEngine, TimeoutPolicy};
pub use error::{LongCallError, Result};
pub use task::{CachedResponse, PollOutcome, Submission, TaskFailure, TaskHandle, TaskStatus};
