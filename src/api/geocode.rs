use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState, CoordinateQuery, validation};

/// GET /api/geocode/reverse?lat=&lng=
pub async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<Value>, ApiError> {
    let coords = validation::parse_coordinates(query.lat.as_deref(), query.lng.as_deref())?;

    let result = state
        .lookup()
        .reverse_geocode(coords)
        .await
        .map_err(|e| {
            ApiError::lookup(&e, "OpenCage geocoding failed", StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(result))
}
