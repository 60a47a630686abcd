//! Single-use OAuth state nonces.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use eatfast_cache::{CacheManager, keys};
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::{CacheProvider, Clock};

use crate::secret::random_hex;

/// Metadata stored with a nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Issuance time in milliseconds since epoch.
    pub timestamp: i64,
    /// Address of the client that started the flow.
    pub ip: Option<String>,
}

/// Creates and consumes state nonces in the ephemeral store.
///
/// A nonce that is unknown, expired or already consumed is rejected the
/// same way.
#[derive(Debug, Clone)]
pub struct OAuthStateStore {
    cache: Arc<CacheManager>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl OAuthStateStore {
    /// Creates a state store with the given nonce lifetime.
    pub fn new(cache: Arc<CacheManager>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { cache, ttl, clock }
    }

    /// Persists a fresh nonce tagged with the requester address.
    pub async fn create(&self, ip: Option<&str>) -> AppResult<String> {
        let nonce = random_hex(32);
        let record = StateRecord {
            timestamp: self.clock.now().timestamp_millis(),
            ip: ip.map(str::to_string),
        };
        self.cache
            .set_json(&keys::oauth_state(&nonce), &record, self.ttl)
            .await?;
        Ok(nonce)
    }

    /// Atomically removes the nonce and returns its record.
    pub async fn consume(&self, nonce: &str) -> AppResult<StateRecord> {
        if nonce.is_empty() {
            return Err(AppError::invalid_state());
        }
        let raw = self
            .cache
            .take(&keys::oauth_state(nonce))
            .await?
            .ok_or_else(AppError::invalid_state)?;
        serde_json::from_str(&raw).map_err(|_| AppError::invalid_state())
    }
}
