//! External identity provider configuration.

use serde::{Deserialize, Serialize};

/// OAuth configuration, one section per provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Google sign-in.
    #[serde(default)]
    pub google: GoogleOAuthConfig,
}

/// Google OAuth 2.0 client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    /// Whether Google sign-in routes are served.
    #[serde(default)]
    pub enabled: bool,
    /// OAuth client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered with Google.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Authorization endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// OpenID Connect userinfo endpoint.
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
    /// Requested scopes.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// State nonce lifetime in seconds.
    #[serde(default = "default_state_ttl")]
    pub state_ttl_seconds: u64,
    /// Timeout for calls to Google, in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            userinfo_url: default_userinfo_url(),
            scopes: default_scopes(),
            state_ttl_seconds: default_state_ttl(),
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/auth/google/callback".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "openid".to_string(),
        "email".to_string(),
        "profile".to_string(),
    ]
}

fn default_state_ttl() -> u64 {
    600
}

fn default_http_timeout() -> u64 {
    10
}
