//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header and runs it through the access guard.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use eatfast_auth::{AccessPolicy, Principal};

use crate::error::ApiError;
use crate::state::AppState;

/// An admitted caller. Rejects the request when admission fails.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    /// Returns the inner `Principal`.
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .guard
            .admit(bearer_token(parts), &AccessPolicy::authenticated())
            .await?;
        Ok(AuthUser(principal))
    }
}

/// The admitted caller, or `None` for anonymous requests.
///
/// Missing, expired and invalid tokens are treated as anonymous; a valid
/// token for a locked or inactive account still rejects.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Principal>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .guard
            .admit_optional(bearer_token(parts), &AccessPolicy::authenticated())
            .await?;
        Ok(MaybeAuthUser(principal))
    }
}

/// Token of a `Bearer` Authorization header. Other schemes count as absent.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}
