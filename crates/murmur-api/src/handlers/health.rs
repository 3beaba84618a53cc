//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let hub = state.realtime.hub();
    let stats = hub.stats().await.ok();

    Json(ApiResponse::ok(HealthResponse {
        status: if stats.is_some() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        hub: stats,
        metrics: hub.metrics().snapshot(),
    }))
}
