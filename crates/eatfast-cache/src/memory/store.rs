//! In-process secret store on moka.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use eatfast_core::config::cache::MemoryCacheConfig;
use eatfast_core::result::AppResult;
use eatfast_core::traits::cache::CacheProvider;

/// A stored string together with its own lifetime.
#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

impl CachedValue {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            ttl,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Per-entry expiry: every write restarts the clock with the entry's TTL.
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Fixed-window counter. The deadline is set once, at creation.
#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Instant,
}

impl Counter {
    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Counters expire at their own deadline; increments do not extend it.
struct WindowDeadline;

impl Expiry<String, Counter> for WindowDeadline {
    fn expire_after_create(
        &self,
        _key: &String,
        counter: &Counter,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(counter.expires_at.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        counter: &Counter,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(counter.expires_at.saturating_duration_since(updated_at))
    }
}

/// In-process secret store for a single instance.
///
/// Values and counters are two moka caches, each bounded by
/// `max_capacity` and evicted as their entries expire.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, CachedValue>,
    counters: Cache<String, Counter>,
}

impl MemoryCacheProvider {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        let counters = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(WindowDeadline)
            .build();

        Self { cache, counters }
    }

    async fn live_counter(&self, key: &str) -> Option<i64> {
        self.counters
            .get(key)
            .await
            .filter(Counter::is_live)
            .map(|c| c.value)
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(value) = self.live_counter(key).await {
            return Ok(Some(value.to_string()));
        }
        Ok(self
            .cache
            .get(key)
            .await
            .filter(CachedValue::is_live)
            .map(|v| v.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.counters.remove(key).await;
        self.cache
            .insert(key.to_string(), CachedValue::new(value.to_string(), ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.counters.remove(key).await;
        Ok(())
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(counter) = self.counters.remove(key).await {
            return Ok(counter.is_live().then(|| counter.value.to_string()));
        }
        Ok(self
            .cache
            .remove(key)
            .await
            .filter(CachedValue::is_live)
            .map(|v| v.value))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn incr(&self, key: &str, window: Duration) -> AppResult<i64> {
        // Upserts on one key are serialized by moka.
        let entry = self
            .counters
            .entry(key.to_string())
            .and_upsert_with(|current| {
                let next = match current.map(|e| e.into_value()) {
                    Some(counter) if counter.is_live() => Counter {
                        value: counter.value + 1,
                        ..counter
                    },
                    _ => Counter {
                        value: 1,
                        expires_at: Instant::now() + window,
                    },
                };
                std::future::ready(next)
            })
            .await;
        Ok(entry.into_value().value)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
