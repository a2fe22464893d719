//! In-process doubles for every upstream adapter, plus helpers for driving
//! the router with `oneshot`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use earthlens::cache::ManualClock;
use earthlens::clients::{
    CountryProvider, Geocoder, KnowledgeGraph, RegionPopulationProvider, SummaryProvider,
    TimezoneProvider, UpstreamError, Upstreams, WeatherProvider,
};
use earthlens::config::Config;
use earthlens::models::{Coordinates, CountryFacts, EntityReference, GeocodeResult, PopulationFact};
use earthlens::state::SharedState;
use http_body_util::BodyExt;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tower::ServiceExt;

/// Call counter and failure switch shared by every double.
#[derive(Default)]
pub struct Switch {
    calls: AtomicUsize,
    failing: AtomicBool,
    missing_key: AtomicBool,
}

impl Switch {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    pub fn unconfigure(&self) {
        self.missing_key.store(true, Ordering::SeqCst);
    }

    fn hit(&self, service: &'static str, key: &'static str) -> Result<usize, UpstreamError> {
        if self.missing_key.load(Ordering::SeqCst) {
            return Err(UpstreamError::MissingCredential(key));
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError::malformed(service, "simulated outage"));
        }
        Ok(n)
    }
}

pub struct FakeGeocoder {
    pub switch: Switch,
    components: Mutex<Map<String, Value>>,
}

impl FakeGeocoder {
    pub fn place(&self, components: Value) {
        if let Value::Object(map) = components {
            *self.components.lock().unwrap() = map;
        }
    }
}

impl Default for FakeGeocoder {
    fn default() -> Self {
        let components = json!({
            "city": "Paris",
            "state": "Île-de-France",
            "country": "France",
            "country_code": "fr"
        });
        Self {
            switch: Switch::default(),
            components: Mutex::new(components.as_object().cloned().unwrap_or_default()),
        }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn reverse(&self, coords: Coordinates) -> Result<GeocodeResult, UpstreamError> {
        self.switch.hit("opencage", "OPENCAGE_KEY")?;
        let components = self.components.lock().unwrap().clone();
        let formatted = components
            .get("city")
            .or_else(|| components.get("country"))
            .and_then(Value::as_str)
            .map(ToString::to_string);
        Ok(serde_json::from_value(json!({
            "formatted": formatted,
            "components": components,
            "geometry": { "lat": coords.lat, "lng": coords.lng }
        }))
        .unwrap())
    }
}

#[derive(Default)]
pub struct FakeWeather {
    pub switch: Switch,
    held: AtomicBool,
    gate: Notify,
}

impl FakeWeather {
    /// Calls block until [`FakeWeather::release`] is called.
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, coords: Coordinates) -> Result<Value, UpstreamError> {
        let n = self.switch.hit("openweathermap", "OPENWEATHER_KEY")?;
        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        Ok(json!({
            "coord": { "lat": coords.lat, "lon": coords.lng },
            "weather": [{ "main": "Clouds", "description": "broken clouds" }],
            "main": { "temp": 18.5 },
            "fetch": n
        }))
    }
}

#[derive(Default)]
pub struct FakeTimezone {
    pub switch: Switch,
}

#[async_trait]
impl TimezoneProvider for FakeTimezone {
    async fn local(&self, _coords: Coordinates) -> Result<Value, UpstreamError> {
        self.switch.hit("timezonedb", "TIMEZONEDB_KEY")?;
        Ok(json!({
            "status": "OK",
            "zoneName": "Europe/Paris",
            "abbreviation": "CEST",
            "formatted": "2026-10-17 14:03:00"
        }))
    }
}

#[derive(Default)]
pub struct FakeSummaries {
    pub switch: Switch,
    missing: Mutex<Vec<String>>,
}

impl FakeSummaries {
    pub fn without_page(&self, title: &str) {
        self.missing.lock().unwrap().push(title.to_string());
    }
}

#[async_trait]
impl SummaryProvider for FakeSummaries {
    async fn summary(&self, title: &str) -> Result<Option<Value>, UpstreamError> {
        self.switch.hit("wikipedia", "")?;
        if self.missing.lock().unwrap().iter().any(|t| t == title) {
            return Ok(None);
        }
        Ok(Some(json!({
            "title": title,
            "extract": format!("{title} is a place on Earth."),
        })))
    }
}

#[derive(Default)]
pub struct FakeKnowledgeGraph {
    pub switch: Switch,
    pub population_queries: AtomicUsize,
    unknown: AtomicBool,
    no_population: AtomicBool,
    slow: AtomicBool,
}

impl FakeKnowledgeGraph {
    pub fn knows_nothing(&self) {
        self.unknown.store(true, Ordering::SeqCst);
    }

    pub fn without_population(&self) {
        self.no_population.store(true, Ordering::SeqCst);
    }

    pub fn stall(&self) {
        self.slow.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KnowledgeGraph for FakeKnowledgeGraph {
    async fn find_entity(&self, label: &str) -> Result<Option<EntityReference>, UpstreamError> {
        self.switch.hit("wikidata", "")?;
        if self.unknown.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(EntityReference {
            id: "Q90".to_string(),
            label: Some(label.to_string()),
            description: Some("capital city of France".to_string()),
        }))
    }

    async fn latest_population(
        &self,
        _entity_id: &str,
    ) -> Result<Option<PopulationFact>, UpstreamError> {
        self.population_queries.fetch_add(1, Ordering::SeqCst);
        if self.slow.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.no_population.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(PopulationFact {
            population: Some(2_102_650),
            point_in_time: Some("2023-01-01T00:00:00Z".to_string()),
        }))
    }
}

#[derive(Default)]
pub struct FakeCountries {
    pub switch: Switch,
}

#[async_trait]
impl CountryProvider for FakeCountries {
    async fn country(&self, name: &str) -> Result<Option<CountryFacts>, UpstreamError> {
        self.switch.hit("restcountries", "")?;
        if !name.eq_ignore_ascii_case("france") {
            return Ok(None);
        }
        Ok(Some(CountryFacts {
            common_name: Some("France".to_string()),
            capital: Some("Paris".to_string()),
            population: Some(68_000_000),
            area_km2: Some(551_695.0),
            flag_url: Some("https://flagcdn.com/fr.svg".to_string()),
            region: Some("Europe".to_string()),
            subregion: Some("Western Europe".to_string()),
            currencies: vec!["EUR".to_string()],
        }))
    }
}

#[derive(Default)]
pub struct FakeRegions {
    pub switch: Switch,
}

#[async_trait]
impl RegionPopulationProvider for FakeRegions {
    async fn population(&self, _country: &str, _state: &str) -> Result<Option<u64>, UpstreamError> {
        self.switch.hit("countriesnow", "")?;
        Ok(Some(12_271_794))
    }
}

#[derive(Default)]
pub struct Fakes {
    pub geocoder: Arc<FakeGeocoder>,
    pub weather: Arc<FakeWeather>,
    pub timezone: Arc<FakeTimezone>,
    pub summaries: Arc<FakeSummaries>,
    pub knowledge_graph: Arc<FakeKnowledgeGraph>,
    pub countries: Arc<FakeCountries>,
    pub regions: Arc<FakeRegions>,
}

impl Fakes {
    pub fn upstreams(&self) -> Upstreams {
        Upstreams {
            geocoder: self.geocoder.clone(),
            weather: self.weather.clone(),
            timezone: self.timezone.clone(),
            summaries: self.summaries.clone(),
            knowledge_graph: self.knowledge_graph.clone(),
            countries: self.countries.clone(),
            regions: self.regions.clone(),
        }
    }

    /// Total upstream calls across every double.
    pub fn total_calls(&self) -> usize {
        self.geocoder.switch.calls()
            + self.weather.switch.calls()
            + self.timezone.switch.calls()
            + self.summaries.switch.calls()
            + self.knowledge_graph.switch.calls()
            + self.countries.switch.calls()
            + self.regions.switch.calls()
    }
}

pub struct TestApp {
    pub router: Router,
    pub fakes: Fakes,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_fakes(config, Fakes::default())
    }

    pub fn with_fakes(config: Config, fakes: Fakes) -> Self {
        let clock = Arc::new(ManualClock::new());
        let shared = SharedState::with_upstreams(config, fakes.upstreams(), clock.clone());
        let state = earthlens::api::create_app_state(Arc::new(shared), None);
        Self {
            router: earthlens::api::router(state),
            fakes,
            clock,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send("GET", uri).await
    }

    pub async fn send(&self, method: &str, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        self.send_json("GET", uri).await
    }

    pub async fn send_json(&self, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = self.send(method, uri).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
