use std::sync::Arc;
use std::time::Duration;

use crate::api::rate_limit::FixedWindowLimiter;
use crate::cache::{Clock, MemoryCache, SystemClock};
use crate::clients::Upstreams;
use crate::config::Config;
use crate::services::{ExploreService, LookupService};

/// Process-wide state handed to every request.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub cache: Arc<MemoryCache>,

    pub lookup: Arc<LookupService>,

    pub explore: Arc<ExploreService>,

    pub rate_limiter: Option<Arc<FixedWindowLimiter>>,
}

impl SharedState {
    /// Wires the real HTTP adapters and the system clock.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let upstreams = Upstreams::from_config(&config)?;
        Ok(Self::with_upstreams(config, upstreams, Arc::new(SystemClock)))
    }

    /// Wires the given adapters and clock; used directly by tests.
    #[must_use]
    pub fn with_upstreams(config: Config, upstreams: Upstreams, clock: Arc<dyn Clock>) -> Self {
        let cache = Arc::new(MemoryCache::new(
            clock.clone(),
            Duration::from_secs(config.cache.default_ttl_seconds),
            config.cache.max_entries,
        ));

        let lookup = Arc::new(LookupService::from_config(cache.clone(), upstreams, &config));
        let explore = Arc::new(ExploreService::new(lookup.clone()));

        let rate_limiter = config.rate_limit.enabled.then(|| {
            Arc::new(FixedWindowLimiter::new(
                clock,
                Duration::from_secs(config.rate_limit.window_seconds),
                config.rate_limit.max_requests,
            ))
        });

        Self {
            config: Arc::new(config),
            cache,
            lookup,
            explore,
            rate_limiter,
        }
    }
}
