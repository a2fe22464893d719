//! Health, fallback and cache administration endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState, CacheClearedResponse, HealthResponse};
use crate::constants;

/// GET /
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: constants::SERVICE_NAME,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Any route nothing else matched.
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// DELETE /api/cache
///
/// Drops every cached upstream answer.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<CacheClearedResponse> {
    let cleared = state.shared.cache.clear().await;
    tracing::info!(cleared, "Cache cleared");
    Json(CacheClearedResponse { cleared })
}
