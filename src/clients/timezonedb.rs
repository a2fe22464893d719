use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{TimezoneProvider, UpstreamError, endpoint, fetch_json};
use crate::models::Coordinates;

const SERVICE: &str = "timezonedb";

#[derive(Clone)]
pub struct TimezoneDbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TimezoneDbClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

/// TimeZoneDB answers 200 even for failures and reports them in the body.
fn check_body(body: Value) -> Result<Value, UpstreamError> {
    match body.get("status").and_then(Value::as_str) {
        Some("FAILED") => {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("lookup failed");
            Err(UpstreamError::malformed(SERVICE, message))
        }
        _ => Ok(body),
    }
}

#[async_trait]
impl TimezoneProvider for TimezoneDbClient {
    async fn local(&self, coords: Coordinates) -> Result<Value, UpstreamError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential("TIMEZONEDB_KEY"))?;

        let mut url = endpoint(SERVICE, &self.base_url)?;
        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("format", "json")
            .append_pair("by", "position")
            .append_pair("lat", &coords.lat.to_string())
            .append_pair("lng", &coords.lng.to_string());

        debug!(%coords, "Fetching local time zone");

        let body: Value = fetch_json(SERVICE, self.client.get(url)).await?;
        check_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_status_is_an_error() {
        let err = check_body(json!({"status": "FAILED", "message": "Invalid API key."})).unwrap_err();
        assert!(err.to_string().contains("Invalid API key."));
    }

    #[test]
    fn test_ok_body_passes_through() {
        let body = json!({"status": "OK", "zoneName": "Europe/Paris", "gmtOffset": 3600});
        assert_eq!(check_body(body.clone()).unwrap(), body);
    }
}
