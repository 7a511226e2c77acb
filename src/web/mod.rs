//! # Web API Module
//!
//! Axum adapter exposing the task engine over HTTP.
//!
//! ## Core Components
//!
//! - [`routes`] - HTTP route definitions
//! - [`handlers`] - Request handlers for each endpoint group
//! - [`responses`] - Header and status mapping of submissions and poll outcomes
//! - [`errors`] - `ApiError` and its JSON rendering
//! - [`state`] - Shared application state

pub mod errors;
pub mod handlers;
pub mod responses;
pub mod routes;
pub mod state;

use axum::Router;

pub use errors::{ApiError, ApiResult};
pub use state::{AppState, DemoResult, LongCallEngine, WebConfig};

/// Create the Axum application with all routes and shared state
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::long_call_routes())
        .with_state(app_state)
}
