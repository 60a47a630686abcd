//! HS256 token issuer with separate access and refresh secrets.
//!
//! Expiry is checked against the injected [`Clock`] rather than by
//! `jsonwebtoken`, so an elapsed token yields `TokenExpired` while every
//! other defect (bad signature, wrong secret, malformed payload, wrong kind)
//! yields `TokenInvalid`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use eatfast_core::config::AuthConfig;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::Clock;
use eatfast_entity::account::Account;
use eatfast_entity::role::Role;

use super::claims::{AccessClaims, RefreshClaims, TimedClaims, TokenKind};

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Signs and verifies access and refresh tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            access_encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
            clock,
        }
    }

    /// Issues an access token carrying identity, role and permissions, and a
    /// refresh token carrying only the account id.
    pub fn issue(&self, account: &Account, role: &Role) -> AppResult<TokenPair> {
        let now = self.clock.now();
        let access_exp = now + self.access_ttl;
        let refresh_exp = now + self.refresh_ttl;

        let access = AccessClaims {
            account_id: account.id,
            email: account.email.clone(),
            role: role.name,
            permissions: role.permissions.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            typ: TokenKind::Access,
        };
        let refresh = RefreshClaims {
            account_id: account.id,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            typ: TokenKind::Refresh,
        };

        let access_token = encode(&Header::default(), &access, &self.access_encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;
        let refresh_token = encode(&Header::default(), &refresh, &self.refresh_encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access_exp,
            refresh_expires_at: refresh_exp,
        })
    }

    /// Verifies an access token against the access secret.
    pub fn verify_access(&self, token: &str) -> AppResult<AccessClaims> {
        self.verify(token, TokenKind::Access, &self.access_decoding)
    }

    /// Verifies a refresh token against the refresh secret.
    pub fn verify_refresh(&self, token: &str) -> AppResult<RefreshClaims> {
        self.verify(token, TokenKind::Refresh, &self.refresh_decoding)
    }

    /// Refresh token lifetime, used for the cookie max-age.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn verify<T>(&self, token: &str, expected: TokenKind, key: &DecodingKey) -> AppResult<T>
    where
        T: DeserializeOwned + TimedClaims,
    {
        let claims = decode::<T>(token, key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::token_invalid("Invalid token signature")
                }
                _ => AppError::token_invalid("Invalid token"),
            })?
            .claims;

        if claims.kind() != expected {
            return Err(AppError::token_invalid("Unexpected token type"));
        }
        if self.clock.now().timestamp() >= claims.expires_at() {
            return Err(AppError::token_expired());
        }
        Ok(claims)
    }
}
