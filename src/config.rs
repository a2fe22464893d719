use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub credentials: CredentialsConfig,

    pub upstreams: UpstreamConfig,

    pub cache: CacheConfig,

    pub rate_limit: RateLimitConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 4000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Upstream API keys. A missing key makes the matching endpoint answer with
/// a configuration error instead of calling out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub opencage_key: Option<String>,

    pub openweather_key: Option<String>,

    pub timezonedb_key: Option<String>,
}

impl CredentialsConfig {
    fn masked(value: Option<&String>) -> Option<String> {
        value.map(|_| "********".to_string())
    }

    #[must_use]
    pub fn masked_copy(&self) -> Self {
        Self {
            opencage_key: Self::masked(self.opencage_key.as_ref()),
            openweather_key: Self::masked(self.openweather_key.as_ref()),
            timezonedb_key: Self::masked(self.timezonedb_key.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub opencage_url: String,

    pub openweather_url: String,

    pub timezonedb_url: String,

    pub wikipedia_url: String,

    pub wikidata_api_url: String,

    pub wikidata_sparql_url: String,

    pub restcountries_url: String,

    pub countriesnow_url: String,

    /// Contact appended to the User-Agent, as Wikimedia asks of API clients.
    pub contact: String,

    /// Request timeout in seconds (default: 15)
    pub request_timeout_seconds: u64,

    /// Upper bound on the population fact query in seconds (default: 10)
    pub population_query_timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            opencage_url: "https://api.opencagedata.com/geocode/v1/json".to_string(),
            openweather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            timezonedb_url: "http://api.timezonedb.com/v2.1/get-time-zone".to_string(),
            wikipedia_url: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
            wikidata_api_url: "https://www.wikidata.org/w/api.php".to_string(),
            wikidata_sparql_url: "https://query.wikidata.org/sparql".to_string(),
            restcountries_url: "https://restcountries.com/v3.1/name".to_string(),
            countriesnow_url: "https://countriesnow.space/api/v0.1/countries/state/cities"
                .to_string(),
            contact: "contact@example.com".to_string(),
            request_timeout_seconds: 15,
            population_query_timeout_seconds: 10,
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!(
            "{}/{} ({})",
            constants::SERVICE_NAME,
            env!("CARGO_PKG_VERSION"),
            self.contact
        )
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub const fn population_query_timeout(&self) -> Duration {
        Duration::from_secs(self.population_query_timeout_seconds)
    }
}

/// Per-endpoint cache lifetimes in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub default_ttl_seconds: u64,

    pub geocode_ttl_seconds: u64,

    pub weather_ttl_seconds: u64,

    pub timezone_ttl_seconds: u64,

    pub summary_ttl_seconds: u64,

    pub population_ttl_seconds: u64,

    pub place_detail_ttl_seconds: u64,

    pub purge_interval_seconds: u64,

    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        use constants::cache::*;
        Self {
            default_ttl_seconds: DEFAULT_TTL.as_secs(),
            geocode_ttl_seconds: GEOCODE_TTL_SECS,
            weather_ttl_seconds: WEATHER_TTL_SECS,
            timezone_ttl_seconds: TIMEZONE_TTL_SECS,
            summary_ttl_seconds: SUMMARY_TTL_SECS,
            population_ttl_seconds: POPULATION_TTL_SECS,
            place_detail_ttl_seconds: PLACE_DETAIL_TTL_SECS,
            purge_interval_seconds: PURGE_INTERVAL_SECS,
            max_entries: MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,

    pub window_seconds: u64,

    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: constants::rate_limit::WINDOW_SECS,
            max_requests: constants::rate_limit::MAX_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and
    /// environment overrides.
    pub fn load() -> Result<Self> {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes the defaults to `config.toml`; `false` if the file already exists.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            Ok(true)
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(constants::SERVICE_NAME).join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".earthlens").join("config.toml"));
        }

        paths
    }

    /// Environment values win over the file. `lookup` is injected so tests
    /// do not touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENCAGE_KEY") {
            self.credentials.opencage_key = Some(key);
        }
        if let Some(key) = non_empty("OPENWEATHER_KEY") {
            self.credentials.openweather_key = Some(key);
        }
        if let Some(key) = non_empty("TIMEZONEDB_KEY") {
            self.credentials.timezonedb_key = Some(key);
        }
        if let Some(port) = non_empty("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(ttl) = non_empty("CACHE_TTL_WEATHER").and_then(|v| v.parse().ok()) {
            self.cache.weather_ttl_seconds = ttl;
        }
        if let Some(ttl) = non_empty("CACHE_TTL_WIKI").and_then(|v| v.parse().ok()) {
            self.cache.summary_ttl_seconds = ttl;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.enabled
            && (self.rate_limit.window_seconds == 0 || self.rate_limit.max_requests == 0)
        {
            anyhow::bail!("Rate limit window and max requests must be > 0 when enabled");
        }

        if self.cache.max_entries == 0 {
            anyhow::bail!("Cache max_entries must be > 0");
        }

        let urls = [
            ("opencage_url", &self.upstreams.opencage_url),
            ("openweather_url", &self.upstreams.openweather_url),
            ("timezonedb_url", &self.upstreams.timezonedb_url),
            ("wikipedia_url", &self.upstreams.wikipedia_url),
            ("wikidata_api_url", &self.upstreams.wikidata_api_url),
            ("wikidata_sparql_url", &self.upstreams.wikidata_sparql_url),
            ("restcountries_url", &self.upstreams.restcountries_url),
            ("countriesnow_url", &self.upstreams.countriesnow_url),
        ];
        for (name, value) in urls {
            url::Url::parse(value)
                .with_context(|| format!("Invalid upstream URL for {name}: {value:?}"))?;
        }

        if self.upstreams.population_query_timeout_seconds == 0 {
            anyhow::bail!("Population query timeout must be > 0");
        }

        Ok(())
    }

    /// The effective configuration with credentials masked, as TOML.
    pub fn to_masked_toml(&self) -> Result<String> {
        let mut copy = self.clone();
        copy.credentials = self.credentials.masked_copy();
        Ok(toml::to_string_pretty(&copy)?)
    }
}
