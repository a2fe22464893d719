//! Country- and region-level detail endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState, CountryQuery, StateQuery, validation};

/// GET /api/country/info?country=
pub async fn country_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<Value>, ApiError> {
    let country = validation::validate_place_name(query.country.as_deref(), "Country is required")?;

    let detail = state
        .lookup()
        .country_info(country)
        .await
        .map_err(|e| {
            ApiError::lookup(&e, "Failed to fetch country info.", StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(detail))
}

/// GET /api/state/info?country=&state=
pub async fn state_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StateQuery>,
) -> Result<Json<Value>, ApiError> {
    const MISSING: &str = "Country and state are required.";
    let country = validation::validate_place_name(query.country.as_deref(), MISSING)?;
    let region = validation::validate_place_name(query.state.as_deref(), MISSING)?;

    let detail = state
        .lookup()
        .state_info(country, region)
        .await
        .map_err(|e| {
            ApiError::lookup(&e, "Failed to fetch state info.", StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(detail))
}
