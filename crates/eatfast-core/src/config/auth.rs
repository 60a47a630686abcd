//! Authentication configuration.

use serde::{Deserialize, Serialize};

const PLACEHOLDER_ACCESS_SECRET: &str = "CHANGE_ME_ACCESS_SECRET";
const PLACEHOLDER_REFRESH_SECRET: &str = "CHANGE_ME_REFRESH_SECRET";

/// Token, password, lockout, and one-time code configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Secret key for refresh token signing. Must differ from `jwt_secret`.
    #[serde(default = "default_jwt_refresh_secret")]
    pub jwt_refresh_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: i64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Failed login attempts before the account is locked.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i32,
    /// Account lockout duration in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: i64,
    /// One-time code lifetime in seconds.
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: u64,
    /// Wrong code submissions tolerated before the live code is destroyed.
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: i64,
    /// Password reset token lifetime in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: u64,
}

impl AuthConfig {
    /// Whether either signing secret is still the built-in placeholder.
    pub fn uses_placeholder_secrets(&self) -> bool {
        self.jwt_secret == PLACEHOLDER_ACCESS_SECRET
            || self.jwt_refresh_secret == PLACEHOLDER_REFRESH_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_refresh_secret: default_jwt_refresh_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout(),
            code_ttl_seconds: default_code_ttl(),
            max_code_attempts: default_max_code_attempts(),
            reset_token_ttl_minutes: default_reset_ttl(),
        }
    }
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_ACCESS_SECRET.to_string()
}

fn default_jwt_refresh_secret() -> String {
    PLACEHOLDER_REFRESH_SECRET.to_string()
}

fn default_access_ttl() -> i64 {
    15
}

fn default_refresh_ttl() -> i64 {
    7
}

fn default_password_min() -> usize {
    8
}

fn default_max_failed() -> i32 {
    5
}

fn default_lockout() -> i64 {
    15
}

fn default_code_ttl() -> u64 {
    600
}

fn default_max_code_attempts() -> i64 {
    5
}

fn default_reset_ttl() -> u64 {
    60
}
