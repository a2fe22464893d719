use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState, TitleQuery, validation};

/// GET /api/wiki/summary?title=
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Value>, ApiError> {
    let title = validation::validate_place_name(query.title.as_deref(), "title required")?;

    let summary = state
        .lookup()
        .summary(title)
        .await
        .map_err(|e| ApiError::lookup(&e, "Wikipedia fetch failed", StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(summary))
}
