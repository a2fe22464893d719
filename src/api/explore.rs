use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, AppState, ExploreQuery, validation};
use crate::models::CompositeInfo;

/// GET /api/explore?lat=&lng=[&altitude=]
///
/// Fails only when the location itself cannot be resolved; every other
/// part of the answer is `null` when its lookup fails.
pub async fn explore(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExploreQuery>,
) -> Result<Json<CompositeInfo>, ApiError> {
    let coords = validation::parse_coordinates(query.lat.as_deref(), query.lng.as_deref())?;
    let altitude = validation::parse_altitude(query.altitude.as_deref())?;

    let info = state
        .explore()
        .explore(coords, altitude)
        .await
        .map_err(|e| {
            ApiError::lookup(&e, "Failed to fetch info", StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(info))
}
