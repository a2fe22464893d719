pub const SERVICE_NAME: &str = "earthlens";

pub mod cache {
    use std::time::Duration;

    pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

    pub const GEOCODE_TTL_SECS: u64 = 30 * 60;

    pub const WEATHER_TTL_SECS: u64 = 2 * 60;

    pub const TIMEZONE_TTL_SECS: u64 = 10 * 60;

    pub const SUMMARY_TTL_SECS: u64 = 6 * 60 * 60;

    pub const POPULATION_TTL_SECS: u64 = 6 * 60 * 60;

    pub const PLACE_DETAIL_TTL_SECS: u64 = 6 * 60 * 60;

    pub const PURGE_INTERVAL_SECS: u64 = 60;

    pub const MAX_ENTRIES: u64 = 10_000;
}

pub mod explore {
    /// Camera altitude strictly below which a click asks for region detail.
    pub const STATE_DETAIL_ALTITUDE: f64 = 1.8;

    pub const FALLBACK_PLACE_NAME: &str = "Earth";
}

pub mod sentinel {
    pub const NOT_AVAILABLE: &str = "N/A";

    pub const NO_SUMMARY: &str = "No Wikipedia summary found.";

    pub const NO_ENTITY: &str = "No Wikidata entity found for that name";

    pub const NO_POPULATION: &str = "No population data found in Wikidata";
}

pub mod rate_limit {
    pub const WINDOW_SECS: u64 = 60;

    pub const MAX_REQUESTS: u32 = 60;

    pub const MESSAGE: &str = "Too many requests, please slow down.";
}
