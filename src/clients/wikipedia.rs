use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{SummaryProvider, UpstreamError, endpoint_with_segment, fetch_json_optional};

const SERVICE: &str = "wikipedia";

/// Page summaries from the Wikipedia REST API.
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    base_url: String,
}

impl WikipediaClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl SummaryProvider for WikipediaClient {
    async fn summary(&self, title: &str) -> Result<Option<Value>, UpstreamError> {
        let url = endpoint_with_segment(SERVICE, &self.base_url, title)?;

        debug!(title, "Fetching page summary");

        fetch_json_optional(SERVICE, self.client.get(url), true).await
    }
}
