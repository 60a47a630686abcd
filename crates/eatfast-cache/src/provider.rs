//! Front door of the ephemeral secret store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use eatfast_core::config::cache::CacheConfig;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::cache::CacheProvider;

/// Holds whichever backend `cache.provider` names; flows only see this type.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Connects the configured backend. Redis is dialled eagerly so a bad
    /// URL fails startup rather than the first sign-in.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Secret store backend: redis");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Secret store backend: in-process (single instance only)");
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "cache.provider '{other}' is not available in this build (expected memory or redis)"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Wrap an already-built backend.
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }

    /// In-memory manager with default capacity.
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        Self::from_provider(Arc::new(crate::memory::MemoryCacheProvider::new(
            &Default::default(),
        )))
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.take(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn incr(&self, key: &str, window: Duration) -> AppResult<i64> {
        self.inner.incr(key, window).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
