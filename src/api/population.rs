use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState, PopulationQuery, validation};

/// GET /api/population?city= (or ?title=)
///
/// "No entity" and "no population fact" are ordinary 200 answers with
/// `population: null` and a `message`. Failures include the underlying
/// error text in `details`.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PopulationQuery>,
) -> Result<Json<Value>, ApiError> {
    let raw = query
        .city
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .or(query.title.as_deref());
    let name = validation::validate_place_name(
        raw,
        "Please provide ?city=CityName or ?title=PlaceName",
    )?;

    let payload = state
        .lookup()
        .population(name)
        .await
        .map_err(|e| ApiError::lookup_with_details(&e, "Population lookup failed"))?;

    Ok(Json(payload))
}
