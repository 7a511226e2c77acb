//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use crate::cache::ResponseCache;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: String,
    pub timestamp: String,
}

/// Basic health check endpoint: GET /health
///
/// Healthy while the result cache answers its own health check.
pub async fn basic_health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let cache = state.engine.cache();
    let provider = cache.provider_name();

    match tokio::time::timeout(state.config.request_timeout, cache.health_check()).await {
        Ok(Ok(true)) => {
            debug!(cache = provider, "Health check passed");
            Ok(Json(HealthResponse {
                status: "healthy".to_string(),
                cache: provider.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }))
        }
        Ok(Ok(false)) => {
            error!(cache = provider, "Result cache reported unhealthy");
            Err(ApiError::cache_unavailable(format!("{provider} cache unhealthy")))
        }
        Ok(Err(e)) => {
            error!(cache = provider, error = %e, "Result cache health check failed");
            Err(e.into())
        }
        Err(_) => {
            error!(cache = provider, "Result cache health check timed out");
            Err(ApiError::cache_unavailable(format!(
                "{provider} cache health check timed out"
            )))
        }
    }
}
