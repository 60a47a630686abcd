//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use eatfast_core::traits::CacheProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_ok = match state.cache.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if cache_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: if cache_ok { "connected" } else { "unavailable" }.to_string(),
    })
}
