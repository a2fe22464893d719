use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState, CoordinateQuery, validation};

/// GET /api/timezone/local?lat=&lng=
///
/// A missing TimeZoneDB key is reported as a 400.
pub async fn local(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<Value>, ApiError> {
    let coords = validation::parse_coordinates(query.lat.as_deref(), query.lng.as_deref())?;

    let zone = state
        .lookup()
        .timezone(coords)
        .await
        .map_err(|e| ApiError::lookup(&e, "Timezone fetch failed", StatusCode::BAD_REQUEST))?;

    Ok(Json(zone))
}
