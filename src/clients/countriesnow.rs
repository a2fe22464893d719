use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{RegionPopulationProvider, UpstreamError, endpoint, fetch_json};
use crate::models::PopulationFact;

const SERVICE: &str = "countriesnow";

#[derive(Clone)]
pub struct CountriesNowClient {
    client: Client,
    base_url: String,
}

impl CountriesNowClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

/// Reads a top-level `population` number or numeric string, if any.
fn population_of(body: &Value) -> Option<u64> {
    match body.get("population")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => PopulationFact::parse_count(s),
        _ => None,
    }
}

#[async_trait]
impl RegionPopulationProvider for CountriesNowClient {
    async fn population(&self, country: &str, state: &str) -> Result<Option<u64>, UpstreamError> {
        let mut url = endpoint(SERVICE, &self.base_url)?;
        url.query_pairs_mut()
            .append_pair("country", country)
            .append_pair("state", state);

        debug!(country, state, "Fetching region population");

        let body: Value = fetch_json(SERVICE, self.client.get(url)).await?;
        Ok(population_of(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_population_of() {
        assert_eq!(population_of(&json!({"population": 35_000_000})), Some(35_000_000));
        assert_eq!(population_of(&json!({"population": "1200"})), Some(1200));
        assert_eq!(population_of(&json!({"error": false, "data": ["Kochi"]})), None);
        assert_eq!(population_of(&json!({"population": null})), None);
    }
}
