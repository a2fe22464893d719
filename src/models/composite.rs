use serde::Serialize;
use serde_json::Value;

use super::{Coordinates, DetailLevel, GeocodeResult, PlaceDetail};

/// Everything the globe shows for one clicked point. The four trailing
/// fields are independently `null` when their lookup failed.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeInfo {
    pub lat: f64,
    pub lng: f64,
    pub altitude: Option<f64>,
    pub level: DetailLevel,
    pub geo: GeocodeResult,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub details: Option<PlaceDetail>,
    pub weather: Option<Value>,
    pub time: Option<Value>,
    pub wiki: Option<Value>,
    pub pop: Option<Value>,
}

impl CompositeInfo {
    #[must_use]
    pub fn at(coords: Coordinates, altitude: Option<f64>, geo: GeocodeResult) -> Self {
        let names = geo.place_names();
        Self {
            lat: coords.lat,
            lng: coords.lng,
            altitude,
            level: DetailLevel::Country,
            country: names.country,
            state: names.state,
            city: names.city,
            geo,
            details: None,
            weather: None,
            time: None,
            wiki: None,
            pop: None,
        }
    }
}
