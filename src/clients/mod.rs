//! Adapters for the third-party services behind each endpoint.
//!
//! Every adapter sits behind a small trait so the lookup layer can be driven
//! by doubles in tests. Adapters never cache; they build the outbound
//! request, call the upstream once and normalize what comes back.

pub mod countriesnow;
pub mod opencage;
pub mod openweather;
pub mod restcountries;
pub mod timezonedb;
pub mod wikidata;
pub mod wikipedia;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::models::{Coordinates, CountryFacts, EntityReference, GeocodeResult, PopulationFact};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    #[error("{service} returned an unusable response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },

    #[error("{service} did not answer within {seconds}s")]
    Timeout { service: &'static str, seconds: u64 },
}

impl UpstreamError {
    pub fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }

    #[must_use]
    pub const fn service(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "configuration",
            Self::Request { service, .. }
            | Self::Status { service, .. }
            | Self::Malformed { service, .. }
            | Self::Timeout { service, .. } => service,
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, coords: Coordinates) -> Result<GeocodeResult, UpstreamError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, coords: Coordinates) -> Result<Value, UpstreamError>;
}

#[async_trait]
pub trait TimezoneProvider: Send + Sync {
    async fn local(&self, coords: Coordinates) -> Result<Value, UpstreamError>;
}

#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// `Ok(None)` when the encyclopedia has no page under `title`.
    async fn summary(&self, title: &str) -> Result<Option<Value>, UpstreamError>;
}

#[async_trait]
pub trait KnowledgeGraph: Send + Sync {
    /// Best match for a free-text label; only the first hit is considered.
    async fn find_entity(&self, label: &str) -> Result<Option<EntityReference>, UpstreamError>;

    /// Most recent population statement attached to `entity_id`.
    async fn latest_population(
        &self,
        entity_id: &str,
    ) -> Result<Option<PopulationFact>, UpstreamError>;
}

#[async_trait]
pub trait CountryProvider: Send + Sync {
    async fn country(&self, name: &str) -> Result<Option<CountryFacts>, UpstreamError>;
}

#[async_trait]
pub trait RegionPopulationProvider: Send + Sync {
    async fn population(&self, country: &str, state: &str) -> Result<Option<u64>, UpstreamError>;
}

/// One adapter per upstream concern.
#[derive(Clone)]
pub struct Upstreams {
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherProvider>,
    pub timezone: Arc<dyn TimezoneProvider>,
    pub summaries: Arc<dyn SummaryProvider>,
    pub knowledge_graph: Arc<dyn KnowledgeGraph>,
    pub countries: Arc<dyn CountryProvider>,
    pub regions: Arc<dyn RegionPopulationProvider>,
}

impl Upstreams {
    /// Real HTTP adapters sharing one pooled client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = build_shared_http_client(config)?;
        let up = &config.upstreams;
        let creds = &config.credentials;

        Ok(Self {
            geocoder: Arc::new(opencage::OpenCageClient::new(
                http.clone(),
                &up.opencage_url,
                creds.opencage_key.clone(),
            )),
            weather: Arc::new(openweather::OpenWeatherClient::new(
                http.clone(),
                &up.openweather_url,
                creds.openweather_key.clone(),
            )),
            timezone: Arc::new(timezonedb::TimezoneDbClient::new(
                http.clone(),
                &up.timezonedb_url,
                creds.timezonedb_key.clone(),
            )),
            summaries: Arc::new(wikipedia::WikipediaClient::new(
                http.clone(),
                &up.wikipedia_url,
            )),
            knowledge_graph: Arc::new(wikidata::WikidataClient::new(
                http.clone(),
                &up.wikidata_api_url,
                &up.wikidata_sparql_url,
            )),
            countries: Arc::new(restcountries::RestCountriesClient::new(
                http.clone(),
                &up.restcountries_url,
            )),
            regions: Arc::new(countriesnow::CountriesNowClient::new(
                http,
                &up.countriesnow_url,
            )),
        })
    }
}

/// Build a shared HTTP client so every adapter reuses one connection pool.
fn build_shared_http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.upstreams.request_timeout())
        .user_agent(config.upstreams.user_agent())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

pub(crate) fn endpoint(service: &'static str, base: &str) -> Result<Url, UpstreamError> {
    Url::parse(base).map_err(|e| UpstreamError::malformed(service, format!("bad base URL: {e}")))
}

/// Base URL with one extra, percent-encoded path segment.
pub(crate) fn endpoint_with_segment(
    service: &'static str,
    base: &str,
    segment: &str,
) -> Result<Url, UpstreamError> {
    let base = base.trim_end_matches('/');
    endpoint(
        service,
        &format!("{base}/{}", urlencoding::encode(segment)),
    )
}

fn request_error(service: &'static str, source: reqwest::Error) -> UpstreamError {
    UpstreamError::Request { service, source }
}

/// Sends the request and decodes a JSON body, treating any non-2xx as an error.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T, UpstreamError> {
    fetch_json_optional(service, request, false)
        .await?
        .ok_or(UpstreamError::Status {
            service,
            status: StatusCode::NOT_FOUND,
        })
}

/// Like [`fetch_json`], but maps 404 to `Ok(None)` when `not_found_is_empty`.
pub(crate) async fn fetch_json_optional<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
    not_found_is_empty: bool,
) -> Result<Option<T>, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|e| request_error(service, e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND && not_found_is_empty {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(UpstreamError::Status { service, status });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| request_error(service, e))?;

    serde_json::from_slice(&body)
        .map(Some)
        .map_err(|e| UpstreamError::malformed(service, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_is_percent_encoded() {
        let url = endpoint_with_segment(
            "wikipedia",
            "https://en.wikipedia.org/api/rest_v1/page/summary/",
            "São Paulo/../x",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/S%C3%A3o%20Paulo%2F..%2Fx"
        );
    }

    #[test]
    fn test_configuration_errors_are_flagged() {
        let err = UpstreamError::MissingCredential("OPENCAGE_KEY");
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "OPENCAGE_KEY is not configured");

        let err = UpstreamError::Timeout {
            service: "wikidata",
            seconds: 10,
        };
        assert!(!err.is_configuration());
        assert_eq!(err.service(), "wikidata");
    }
}
