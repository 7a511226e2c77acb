//! # Web API Handlers
//!
//! - [`long_call`] - submit and poll endpoints
//! - [`health`] - service and cache health

pub mod health;
pub mod long_call;
