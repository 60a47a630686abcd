//! Request rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Fixed-window rate limits, counted per client IP in the shared cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether limits are enforced.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Requests per window on credential-guessing endpoints.
    #[serde(default = "default_strict")]
    pub strict: i64,
    /// Requests per window on token and OAuth endpoints.
    #[serde(default = "default_moderate")]
    pub moderate: i64,
    /// Requests per window on read-only endpoints.
    #[serde(default = "default_lenient")]
    pub lenient: i64,
    /// Key clients by the first `X-Forwarded-For` hop instead of the
    /// socket peer. Only safe behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_seconds: default_window(),
            strict: default_strict(),
            moderate: default_moderate(),
            lenient: default_lenient(),
            trust_forwarded_for: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window() -> u64 {
    15 * 60
}

fn default_strict() -> i64 {
    5
}

fn default_moderate() -> i64 {
    50
}

fn default_lenient() -> i64 {
    200
}
