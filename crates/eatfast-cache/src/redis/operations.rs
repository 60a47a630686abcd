//! Secret store commands against Redis.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;
use eatfast_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Ephemeral secrets kept in Redis with native expiry.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Namespaced key plus a handle on the shared connection.
    fn target(&self, key: &str) -> (String, ConnectionManager) {
        (self.client.prefixed_key(key), self.client.conn_mut())
    }
}

fn redis_failure(command: &'static str) -> impl FnOnce(redis::RedisError) -> AppError {
    move |e| AppError::with_source(ErrorKind::Cache, format!("Redis {command} failed: {e}"), e)
}

/// `SETEX` and `SET EX` reject a zero lifetime, so sub-second TTLs round up.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let (key, mut conn) = self.target(key);
        conn.get(&key).await.map_err(redis_failure("GET"))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let (key, mut conn) = self.target(key);
        conn.set_ex::<_, _, ()>(&key, value, ttl_secs(ttl))
            .await
            .map_err(redis_failure("SETEX"))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let (key, mut conn) = self.target(key);
        conn.del::<_, ()>(&key).await.map_err(redis_failure("DEL"))
    }

    // GETDEL makes single-use secrets atomic across replicas of the service.
    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        let (key, mut conn) = self.target(key);
        redis::cmd("GETDEL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(redis_failure("GETDEL"))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let (key, mut conn) = self.target(key);
        conn.exists(&key).await.map_err(redis_failure("EXISTS"))
    }

    // SET NX EX and INCR share one MULTI, so a counter never exists
    // without its deadline.
    async fn incr(&self, key: &str, window: Duration) -> AppResult<i64> {
        let (key, mut conn) = self.target(key);
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("EX")
            .arg(ttl_secs(window))
            .arg("NX")
            .ignore()
            .incr(&key, 1i64)
            .query_async(&mut conn)
            .await
            .map_err(redis_failure("MULTI SET NX EX/INCR"))?;
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_failure("PING"))?;
        Ok(reply == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_rounds_up_to_one_second() {
        assert_eq!(ttl_secs(Duration::from_millis(200)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(600)), 600);
    }
}
