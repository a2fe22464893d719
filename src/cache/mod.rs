//! In-memory response cache shared by every endpoint, backed by
//! `moka::future::Cache`.
//!
//! Values are stored as JSON so a hit can be returned verbatim. Each entry
//! carries its own TTL; an expired entry is dropped on the next read and by
//! the periodic [`MemoryCache::purge_expired`] sweep.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub ttl: Duration,
    pub expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Lets moka drop each entry on its own TTL instead of one cache-wide value.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

pub struct MemoryCache {
    entries: Cache<String, CacheEntry>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl MemoryCache {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, default_ttl: Duration, max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            entries,
            clock,
            default_ttl,
        }
    }

    /// Expiry is judged by the injected clock, so an entry past its
    /// `expires_at` is dropped here even if moka has not reaped it yet.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key).await?;
        if entry.is_expired(self.clock.now()) {
            self.entries.invalidate(key).await;
            debug!(key, "Cache entry expired");
            return None;
        }
        Some(entry.value)
    }

    /// Stores `value` under `key`, replacing any previous entry.
    /// `None` uses the cache's default TTL.
    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            value,
            ttl,
            expires_at: self.clock.now() + ttl,
        };
        self.entries.insert(key.into(), entry).await;
    }

    pub async fn del(&self, key: &str) -> bool {
        self.entries.remove(key).await.is_some()
    }

    pub async fn clear(&self) -> usize {
        let count = self.entries.iter().count();
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
        count
    }

    /// Number of stored entries, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.entries.iter().count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key)
            .collect();

        for key in &expired {
            self.entries.invalidate(key.as_str()).await;
        }
        self.entries.run_pending_tasks().await;
        expired.len()
    }

    /// Spawns a background sweep that drops expired entries every `interval`.
    pub fn spawn_purge_task(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired cache entries");
                }
            }
        })
    }
}
