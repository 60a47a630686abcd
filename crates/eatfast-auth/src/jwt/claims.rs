//! JWT claim sets for access and refresh tokens.

use serde::{Deserialize, Serialize};

use eatfast_core::types::AccountId;
use eatfast_entity::role::RoleName;

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer token for API requests.
    Access,
    /// Long-lived token for obtaining new access tokens.
    Refresh,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Account the token was issued to.
    pub account_id: AccountId,
    /// Email at issuance.
    pub email: String,
    /// Role name at issuance.
    pub role: RoleName,
    /// Permission set of the role at issuance.
    pub permissions: Vec<String>,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Token kind.
    pub typ: TokenKind,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    /// Account the token was issued to.
    pub account_id: AccountId,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Token kind.
    pub typ: TokenKind,
}

/// Fields the issuer checks on every claim set after the signature.
pub(crate) trait TimedClaims {
    fn kind(&self) -> TokenKind;
    fn expires_at(&self) -> i64;
}

impl TimedClaims for AccessClaims {
    fn kind(&self) -> TokenKind {
        self.typ
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl TimedClaims for RefreshClaims {
    fn kind(&self) -> TokenKind {
        self.typ
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}
