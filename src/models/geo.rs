use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::constants::explore::FALLBACK_PLACE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Returns `None` unless both values are finite and within WGS84 bounds.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

/// Renders as `lat,lng` using the shortest form that round-trips, which is
/// also the cache-key suffix for coordinate lookups.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub lat: f64,
    pub lng: f64,
}

/// Reverse-geocode answer in the shape the front-end consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted: Option<String>,
    #[serde(default)]
    pub components: Map<String, Value>,
    pub geometry: Option<Geometry>,
}

impl GeocodeResult {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            formatted: None,
            components: Map::new(),
            geometry: None,
        }
    }

    fn component(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.components.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(ToString::to_string)
    }

    #[must_use]
    pub fn place_names(&self) -> PlaceNames {
        PlaceNames {
            country: self.component(&["country", "country_name"]),
            state: self.component(&["state", "region"]),
            city: self.component(&["city", "town"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceNames {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl PlaceNames {
    /// Most specific known name, used for summary and population lookups.
    #[must_use]
    pub fn lookup_name(&self) -> &str {
        self.city
            .as_deref()
            .or(self.state.as_deref())
            .or(self.country.as_deref())
            .unwrap_or(FALLBACK_PLACE_NAME)
    }
}
