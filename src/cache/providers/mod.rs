//! Result cache provider implementations

pub mod in_process;

#[cfg(feature = "postgres")]
pub mod shared;

pub use in_process::InProcessResponseCache;

#[cfg(feature = "postgres")]
pub use shared::SharedResponseCache;
