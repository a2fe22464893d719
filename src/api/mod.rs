use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{ExploreService, LookupService};
use crate::state::SharedState;

mod error;
mod explore;
mod geocode;
mod observability;
mod places;
mod population;
pub mod rate_limit;
mod system;
mod timezone;
mod types;
mod validation;
mod weather;
mod wiki;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn lookup(&self) -> &Arc<LookupService> {
        &self.shared.lookup
    }

    #[must_use]
    pub fn explore(&self) -> &Arc<ExploreService> {
        &self.shared.explore
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/geocode/reverse", get(geocode::reverse))
        .route("/weather/current", get(weather::current))
        .route("/timezone/local", get(timezone::local))
        .route("/wiki/summary", get(wiki::summary))
        .route("/population", get(population::lookup))
        .route("/country/info", get(places::country_info))
        .route("/state/info", get(places::state_info))
        .route("/explore", get(explore::explore))
        .route("/cache", delete(system::clear_cache))
        .route("/metrics", get(observability::get_metrics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(system::health))
        .nest("/api", api_router)
        .fallback(system::not_found)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
