//! Google OAuth 2.0 / OpenID Connect client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use eatfast_core::config::GoogleOAuthConfig;
use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;

use super::provider::{ExternalIdentity, IdentityProvider};

/// Token endpoint response; only the access token is used.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OpenID Connect userinfo payload.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    given_name: Option<String>,
    family_name: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Google identity provider backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct GoogleIdentityProvider {
    http: Client,
    config: GoogleOAuthConfig,
}

impl GoogleIdentityProvider {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: &GoogleOAuthConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    async fn fetch_access_token(&self, code: &str) -> AppResult<String> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| upstream("Token request to Google failed", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Google rejected the authorization code");
            return Err(AppError::oauth_verification(
                "Google rejected the authorization code",
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| upstream("Malformed token response from Google", e))?;
        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> AppResult<UserInfo> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| upstream("Userinfo request to Google failed", e))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Google userinfo request was rejected");
            return Err(AppError::oauth_verification(
                "Failed to fetch Google profile",
            ));
        }

        response
            .json()
            .await
            .map_err(|e| upstream("Malformed userinfo response from Google", e))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> AppResult<String> {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| {
            AppError::configuration(format!("Invalid Google authorization URL: {e}"))
        })?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> AppResult<ExternalIdentity> {
        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_user_info(&access_token).await?;

        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::oauth_verification("Google account has no email address"))?;
        if !info.email_verified {
            return Err(AppError::oauth_verification(
                "Google account email is not verified",
            ));
        }

        let (first_name, last_name) = split_names(
            info.given_name,
            info.family_name,
            info.name.as_deref(),
            &email,
        );
        debug!(subject = %info.sub, "Google identity verified");

        Ok(ExternalIdentity {
            subject: info.sub,
            email: email.to_lowercase(),
            first_name,
            last_name,
            picture: info.picture,
        })
    }
}

fn upstream(message: &str, e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::OAuthVerificationFailed, message, e)
}

/// Prefer the structured names; fall back to the display name, then the
/// email local part.
fn split_names(
    given: Option<String>,
    family: Option<String>,
    display: Option<&str>,
    email: &str,
) -> (String, String) {
    let mut display_parts = display.unwrap_or_default().splitn(2, ' ');
    let display_first = display_parts.next().filter(|s| !s.is_empty());
    let display_rest = display_parts.next();

    let first = given
        .or_else(|| display_first.map(str::to_string))
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
    let last = family
        .or_else(|| display_rest.map(str::to_string))
        .unwrap_or_default();
    (first, last)
}
