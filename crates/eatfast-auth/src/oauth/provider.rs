//! Identity provider abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use eatfast_core::result::AppResult;

/// Identity asserted by an external provider after a code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Stable subject identifier at the provider.
    pub subject: String,
    /// Email address, lower-cased.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Avatar URL.
    pub picture: Option<String>,
}

/// An OAuth 2.0 authorization-code identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Authorization URL the browser is sent to, embedding `state`.
    fn authorization_url(&self, state: &str) -> AppResult<String>;

    /// Exchange an authorization code for a verified identity.
    ///
    /// Every provider-side failure surfaces as `OAuthVerificationFailed`.
    async fn exchange_code(&self, code: &str) -> AppResult<ExternalIdentity>;
}
