use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Map;
use tracing::debug;

use super::{Geocoder, UpstreamError, endpoint, fetch_json};
use crate::models::{Coordinates, GeocodeResult, Geometry};

const SERVICE: &str = "opencage";

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    formatted: Option<String>,
    #[serde(default)]
    components: Map<String, serde_json::Value>,
    geometry: Option<Geometry>,
}

#[derive(Clone)]
pub struct OpenCageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenCageClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

fn normalize(response: OpenCageResponse) -> GeocodeResult {
    response
        .results
        .into_iter()
        .next()
        .map_or_else(GeocodeResult::empty, |r| GeocodeResult {
            formatted: r.formatted,
            components: r.components,
            geometry: r.geometry,
        })
}

#[async_trait]
impl Geocoder for OpenCageClient {
    async fn reverse(&self, coords: Coordinates) -> Result<GeocodeResult, UpstreamError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential("OPENCAGE_KEY"))?;

        let mut url = endpoint(SERVICE, &self.base_url)?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{},{}", coords.lat, coords.lng))
            .append_pair("key", key)
            .append_pair("language", "en")
            .append_pair("no_annotations", "1")
            .append_pair("limit", "1");

        debug!(%coords, "Reverse geocoding");

        let response: OpenCageResponse = fetch_json(SERVICE, self.client.get(url)).await?;
        Ok(normalize(response))
    }
}
