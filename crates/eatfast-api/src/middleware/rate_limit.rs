//! Fixed-window rate limiter backed by the shared cache.
//!
//! Counters live in the ephemeral store, so limits hold across server
//! instances when the cache is Redis.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use eatfast_cache::{CacheManager, keys};
use eatfast_core::config::RateLimitConfig;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::CacheProvider;

use crate::error::ApiError;

/// Limit class of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitTier {
    /// Credential-guessing endpoints.
    Strict,
    /// Token and OAuth endpoints.
    Moderate,
    /// Read-only endpoints.
    Lenient,
}

impl RateLimitTier {
    /// Name used in counter keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Moderate => "moderate",
            Self::Lenient => "lenient",
        }
    }
}

/// Counts requests per client and tier.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Arc<CacheManager>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Creates a limiter over the shared cache.
    pub fn new(cache: Arc<CacheManager>, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }

    /// Maximum requests per window for `tier`.
    pub fn limit(&self, tier: RateLimitTier) -> i64 {
        match tier {
            RateLimitTier::Strict => self.config.strict,
            RateLimitTier::Moderate => self.config.moderate,
            RateLimitTier::Lenient => self.config.lenient,
        }
    }

    /// Whether `X-Forwarded-For` identifies the client.
    pub fn trusts_forwarded_for(&self) -> bool {
        self.config.trust_forwarded_for
    }

    /// Records one request and reports whether it is within the limit.
    pub async fn check(&self, tier: RateLimitTier, client: &str) -> AppResult<bool> {
        if !self.config.enabled {
            return Ok(true);
        }

        let key = keys::rate_limit(tier.as_str(), client);
        let count = self
            .cache
            .incr(&key, Duration::from_secs(self.config.window_seconds))
            .await?;
        Ok(count <= self.limit(tier))
    }
}

/// Middleware state: the limiter and the tier of the routes it guards.
#[derive(Debug, Clone)]
pub struct TierLimit {
    limiter: RateLimiter,
    tier: RateLimitTier,
}

impl TierLimit {
    /// Binds `limiter` to `tier`.
    pub fn new(limiter: RateLimiter, tier: RateLimitTier) -> Self {
        Self { limiter, tier }
    }
}

/// Rejects the request with 429 once its client exceeds the tier limit.
///
/// Cache failures let the request through.
pub async fn enforce(State(limit): State<TierLimit>, request: Request, next: Next) -> Response {
    let client = client_address(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
        limit.limiter.trusts_forwarded_for(),
    );

    match limit.limiter.check(limit.tier, &client).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            warn!(client = %client, tier = limit.tier.as_str(), "Rate limit exceeded");
            ApiError(AppError::rate_limited()).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Rate limiter unavailable, allowing request");
            next.run(request).await
        }
    }
}

/// Client address: the socket peer, or the first `X-Forwarded-For` hop
/// when the deployment trusts its proxy.
pub fn client_address(
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
    trust_forwarded_for: bool,
) -> String {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
    };

    trust_forwarded_for
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
