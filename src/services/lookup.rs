//! Cache-or-fetch policy for every endpoint.
//!
//! Each operation computes a key namespaced by endpoint, answers from the
//! cache when it can, and otherwise calls its adapter(s) and writes the
//! normalized JSON through with the endpoint's TTL. Errors are never cached;
//! "no data" answers are.

use serde::Serialize;
use reqwest::StatusCode;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::MemoryCache;
use crate::clients::{UpstreamError, Upstreams};
use crate::config::{CacheConfig, Config};
use crate::models::{
    Coordinates, CountryDetail, GeocodeResult, PopulationPayload, StateDetail,
};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Cached value has an unexpected shape: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl LookupError {
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Upstream(e) if e.is_configuration())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub geocode: Duration,
    pub weather: Duration,
    pub timezone: Duration,
    pub summary: Duration,
    pub population: Duration,
    pub place_detail: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CacheTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            geocode: Duration::from_secs(config.geocode_ttl_seconds),
            weather: Duration::from_secs(config.weather_ttl_seconds),
            timezone: Duration::from_secs(config.timezone_ttl_seconds),
            summary: Duration::from_secs(config.summary_ttl_seconds),
            population: Duration::from_secs(config.population_ttl_seconds),
            place_detail: Duration::from_secs(config.place_detail_ttl_seconds),
        }
    }
}

pub struct LookupService {
    cache: Arc<MemoryCache>,
    upstreams: Upstreams,
    ttls: CacheTtls,
    population_query_timeout: Duration,
}

impl LookupService {
    #[must_use]
    pub const fn new(
        cache: Arc<MemoryCache>,
        upstreams: Upstreams,
        ttls: CacheTtls,
        population_query_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            upstreams,
            ttls,
            population_query_timeout,
        }
    }

    #[must_use]
    pub fn from_config(cache: Arc<MemoryCache>, upstreams: Upstreams, config: &Config) -> Self {
        Self::new(
            cache,
            upstreams,
            CacheTtls::from(&config.cache),
            config.upstreams.population_query_timeout(),
        )
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<MemoryCache> {
        &self.cache
    }

    async fn cached<T, Fut>(
        &self,
        namespace: &'static str,
        key: String,
        ttl: Duration,
        fetch: Fut,
    ) -> Result<Value, LookupError>
    where
        T: Serialize,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        if let Some(value) = self.cache.get(&key).await {
            debug!(%key, "Cache hit");
            metrics::counter!("cache_lookups_total", "namespace" => namespace, "outcome" => "hit")
                .increment(1);
            return Ok(value);
        }

        metrics::counter!("cache_lookups_total", "namespace" => namespace, "outcome" => "miss")
            .increment(1);

        let fresh = fetch.await.inspect_err(|e| {
            metrics::counter!("upstream_failures_total", "service" => e.service()).increment(1);
        })?;

        let value = serde_json::to_value(fresh)?;
        self.cache.set(key, value.clone(), Some(ttl)).await;
        Ok(value)
    }

    pub async fn reverse_geocode(&self, coords: Coordinates) -> Result<Value, LookupError> {
        self.cached(
            "geocode",
            format!("geocode:{coords}"),
            self.ttls.geocode,
            self.upstreams.geocoder.reverse(coords),
        )
        .await
    }

    /// [`Self::reverse_geocode`], decoded.
    pub async fn place_at(&self, coords: Coordinates) -> Result<GeocodeResult, LookupError> {
        let value = self.reverse_geocode(coords).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn weather(&self, coords: Coordinates) -> Result<Value, LookupError> {
        self.cached(
            "weather",
            format!("weather:{coords}"),
            self.ttls.weather,
            self.upstreams.weather.current(coords),
        )
        .await
    }

    pub async fn timezone(&self, coords: Coordinates) -> Result<Value, LookupError> {
        self.cached(
            "timezone",
            format!("timezone:{coords}"),
            self.ttls.timezone,
            self.upstreams.timezone.local(coords),
        )
        .await
    }

    /// Page summary for `title`. A missing page is a `Status` error like any
    /// other non-2xx answer, so it is never cached.
    pub async fn summary(&self, title: &str) -> Result<Value, LookupError> {
        let fetch = async {
            self.upstreams
                .summaries
                .summary(title)
                .await?
                .ok_or(UpstreamError::Status {
                    service: "wikipedia",
                    status: StatusCode::NOT_FOUND,
                })
        };

        self.cached(
            "wiki",
            format!("wiki:{}", title.to_lowercase()),
            self.ttls.summary,
            fetch,
        )
        .await
    }

    /// Just the extract text, with failures logged and swallowed.
    async fn summary_extract(&self, title: &str) -> Option<String> {
        match self.summary(title).await {
            Ok(value) => value
                .get("extract")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            Err(e) => {
                warn!(title, error = %e, "Summary unavailable, using placeholder");
                None
            }
        }
    }

    pub async fn population(&self, name: &str) -> Result<Value, LookupError> {
        let fetch = async {
            let graph = &self.upstreams.knowledge_graph;

            let Some(entity) = graph.find_entity(name).await? else {
                return Ok(PopulationPayload::no_entity(name));
            };

            let fact = tokio::time::timeout(
                self.population_query_timeout,
                graph.latest_population(&entity.id),
            )
            .await
            .map_err(|_| UpstreamError::Timeout {
                service: "wikidata",
                seconds: self.population_query_timeout.as_secs(),
            })??;

            Ok::<_, UpstreamError>(match fact {
                Some(fact) => PopulationPayload::found(name, entity, fact),
                None => PopulationPayload::no_fact(name, entity),
            })
        };

        self.cached(
            "population",
            format!("population:{}", name.to_lowercase()),
            self.ttls.population,
            fetch,
        )
        .await
    }

    /// Country facts plus the encyclopedia extract. Only a failing country
    /// provider fails the lookup; a missing country or summary degrades to
    /// placeholders.
    pub async fn country_info(&self, country: &str) -> Result<Value, LookupError> {
        let fetch = async {
            let facts = self.upstreams.countries.country(country).await?;
            let title = CountryDetail::summary_title(country, facts.as_ref());
            let extract = self.summary_extract(&title).await;
            Ok::<_, UpstreamError>(CountryDetail::assemble(country, facts, extract))
        };

        self.cached(
            "country",
            format!("country:{}", country.to_lowercase()),
            self.ttls.place_detail,
            fetch,
        )
        .await
    }

    pub async fn state_info(&self, country: &str, state: &str) -> Result<Value, LookupError> {
        let fetch = async {
            let (extract, population) = tokio::join!(
                self.summary_extract(state),
                self.upstreams.regions.population(country, state),
            );
            let population = population.unwrap_or_else(|e| {
                warn!(country, state, error = %e, "Region population unavailable");
                None
            });
            Ok::<_, UpstreamError>(StateDetail::assemble(country, state, population, extract))
        };

        self.cached(
            "state",
            format!("state:{}:{}", country.to_lowercase(), state.to_lowercase()),
            self.ttls.place_detail,
            fetch,
        )
        .await
    }
}
