//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eatfast_core::types::{AccountId, RoleId};

use super::provider::AuthProvider;
use super::status::AccountStatus;

/// A registered account.
///
/// At least one of `password_hash` and `google_id` is always present.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Email address, stored lower-cased.
    pub email: String,
    /// Argon2id password hash; absent for accounts that only use Google.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number in E.164 form.
    pub phone: Option<String>,
    /// Assigned role.
    pub role_id: RoleId,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// Whether the email address has been proven.
    pub is_verified: bool,
    /// Consecutive failed password attempts.
    pub failed_login_attempts: i32,
    /// Password logins are refused until this instant.
    pub locked_until: Option<DateTime<Utc>>,
    /// Last completed sign-in.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Google subject identifier.
    pub google_id: Option<String>,
    /// Avatar URL from the identity provider.
    pub profile_picture: Option<String>,
    /// How the account was created.
    pub provider: AuthProvider,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether password logins are refused at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Whether the account has a local password.
    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Whether the account is linked to a Google identity.
    pub fn has_google_identity(&self) -> bool {
        self.google_id.as_deref().is_some_and(|g| !g.is_empty())
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Email address (normalized by the caller).
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Assigned role.
    pub role_id: RoleId,
    /// Initial status.
    pub status: AccountStatus,
    /// Initial verification flag.
    pub is_verified: bool,
    /// Google subject identifier.
    pub google_id: Option<String>,
    /// Avatar URL.
    pub profile_picture: Option<String>,
    /// Creation provider.
    pub provider: AuthProvider,
}

/// Fields written when a Google identity is attached to an existing account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLink {
    /// Google subject identifier.
    pub google_id: String,
    /// Avatar URL.
    pub profile_picture: Option<String>,
    /// Mark the email as verified and promote a `pending` account to `active`.
    pub verify: bool,
}
