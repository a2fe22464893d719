use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: None,
        }
    }

    pub fn with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub cleared: usize,
}

/// Query parameters are kept as raw strings so that a missing or malformed
/// value produces this service's own 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExploreQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub altitude: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PopulationQuery {
    pub city: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountryQuery {
    pub country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    pub country: Option<String>,
    pub state: Option<String>,
}
