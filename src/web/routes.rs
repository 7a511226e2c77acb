//! # Web API Route Definitions

use crate::web::handlers;
use crate::web::state::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Submit-and-poll routes for the long-running operation
pub fn long_call_routes() -> Router<AppState> {
    Router::new()
        .route("/long-call/submit", post(handlers::long_call::submit))
        .route("/long-call/poll/:id", get(handlers::long_call::poll))
}

/// Health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::basic_health))
}
