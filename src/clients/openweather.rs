use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{UpstreamError, WeatherProvider, endpoint, fetch_json};
use crate::models::Coordinates;

const SERVICE: &str = "openweather";

/// Current conditions in metric units, passed through as the provider sends them.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, coords: Coordinates) -> Result<Value, UpstreamError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential("OPENWEATHER_KEY"))?;

        let mut url = endpoint(SERVICE, &self.base_url)?;
        url.query_pairs_mut()
            .append_pair("lat", &coords.lat.to_string())
            .append_pair("lon", &coords.lng.to_string())
            .append_pair("appid", key)
            .append_pair("units", "metric");

        debug!(%coords, "Fetching current weather");

        fetch_json(SERVICE, self.client.get(url)).await
    }
}
