//! # Result Cache Module
//!
//! Maps a task handle to its stored response. The engine writes entries, the
//! poll resolver reads, transitions, and consumes them.
//!
//! ## Architecture
//!
//! ```text
//! CacheProvider<T> (enum)                <- Zero-cost dispatch, no vtable
//!   ├── InProcess(InProcessResponseCache) <- Moka map with idle expiry
//!   └── Shared(SharedResponseCache)       <- PostgreSQL row per handle
//! ```
//!
//! ## Design Decisions
//!
//! - **Enum dispatch**: one backend per process, chosen by `cache.scope`
//! - **Consuming remove**: `remove` returns the entry it deleted so that only
//!   one poller can observe a terminal status
//! - **Compare-and-set**: `replace_if_status` guards the pending transition
//!   against a concurrent terminal write

pub mod errors;
pub mod header_codec;
pub mod provider;
pub mod providers;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use provider::CacheProvider;
pub use providers::InProcessResponseCache;
pub use traits::ResponseCache;

#[cfg(feature = "postgres")]
pub use providers::SharedResponseCache;
