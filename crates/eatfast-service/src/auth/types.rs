//! Inputs and results of the sign-in flows.

use serde::{Deserialize, Serialize};

use eatfast_auth::TokenPair;
use eatfast_core::types::AccountId;
use eatfast_entity::account::AccountView;

/// Data submitted to create a password account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Requested role name or alias; unknown or staff roles fall back to
    /// customer.
    pub role: Option<String>,
}

/// Result of a registration. The verification code goes out by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub account_id: AccountId,
}

/// Result of a correct password. Tokens follow the second factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub account_id: AccountId,
    pub requires_two_factor: bool,
}

/// A signed-in account with its fresh token pair.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub account: AccountView,
    pub tokens: TokenPair,
}

/// Result of an OAuth callback.
#[derive(Debug, Clone)]
pub struct OAuthOutcome {
    pub account: AccountView,
    pub tokens: TokenPair,
    /// Dashboard the client should land on.
    pub redirect_url: String,
    /// Whether the callback created the account.
    pub is_new_user: bool,
}

/// Where to send the browser to start an OAuth sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateOutcome {
    pub auth_url: String,
    pub state: String,
}
