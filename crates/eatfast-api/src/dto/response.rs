//! Response DTOs.

use serde::{Deserialize, Serialize};

use eatfast_core::types::AccountId;
use eatfast_entity::account::AccountView;
use eatfast_entity::role::Role;

/// Generic message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub account_id: AccountId,
    pub message: String,
}

/// Login response. Tokens follow the second factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub account_id: AccountId,
    pub requires_two_factor: bool,
    pub message: String,
}

/// A signed-in account. The refresh token travels in a cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: AccountView,
    pub access_token: String,
    pub message: String,
}

/// Refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Current account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: AccountView,
}

/// Where to send the browser for Google sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleInitResponse {
    pub auth_url: String,
    pub state: String,
}

/// Google callback response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCallbackResponse {
    pub user: AccountView,
    pub access_token: String,
    pub redirect_url: String,
    pub is_new_user: bool,
}

/// Account after a link or unlink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResponse {
    pub user: AccountView,
    pub message: String,
}

/// A role a new account may pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    pub name: String,
    pub description: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            name: role.name.to_string(),
            description: role.description,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `connected` or `unavailable`.
    pub cache: String,
}
