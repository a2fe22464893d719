use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState, CoordinateQuery, validation};

/// GET /api/weather/current?lat=&lng=
pub async fn current(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<Value>, ApiError> {
    let coords = validation::parse_coordinates(query.lat.as_deref(), query.lng.as_deref())?;

    let weather = state
        .lookup()
        .weather(coords)
        .await
        .map_err(|e| ApiError::lookup(&e, "Weather fetch failed", StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(weather))
}
