//! Sanitized account representation returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eatfast_core::types::AccountId;

use super::model::Account;
use super::provider::AuthProvider;
use super::status::AccountStatus;
use crate::role::RoleName;

/// Account data safe to return to its owner. Carries no secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: RoleName,
    pub status: AccountStatus,
    pub is_verified: bool,
    pub profile_picture: Option<String>,
    pub provider: AuthProvider,
    pub has_password: bool,
    pub google_linked: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AccountView {
    /// Build the view of `account` holding `role`.
    pub fn new(account: &Account, role: RoleName) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            phone: account.phone.clone(),
            role,
            status: account.status,
            is_verified: account.is_verified,
            profile_picture: account.profile_picture.clone(),
            provider: account.provider,
            has_password: account.has_password(),
            google_linked: account.has_google_identity(),
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}
