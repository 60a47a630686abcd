//! Key-value provider trait backing the ephemeral secret store.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// All values are strings (JSON for structured records). Every write carries
/// its own TTL; a key that has expired is indistinguishable from one that
/// was never written.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL, replacing any previous value atomically.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Atomically read and delete a key (`GETDEL`).
    ///
    /// Of several concurrent callers at most one observes `Some`.
    async fn take(&self, key: &str) -> AppResult<Option<String>>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Increment a fixed-window counter and return the new value.
    ///
    /// A missing counter is created at 1 with `window` as its lifetime, in
    /// the same atomic step. Later increments leave the deadline alone.
    async fn incr(&self, key: &str, window: Duration) -> AppResult<i64>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json, ttl).await
    }

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
