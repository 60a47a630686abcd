//! Password and OAuth sign-in flows.

pub mod oauth;
pub mod password;
pub mod types;

use std::sync::Arc;

use eatfast_auth::TokenIssuer;
use eatfast_cache::CacheManager;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::Clock;
use eatfast_database::{AccountRepository, RoleRepository};
use eatfast_entity::account::{Account, AccountView};
use eatfast_entity::role::Role;

use crate::notification::NotificationDispatcher;

pub use oauth::OAuthService;
pub use password::PasswordAuthService;
pub use types::{
    InitiateOutcome, LoginOutcome, OAuthOutcome, RegisterInput, RegisterOutcome, SessionOutcome,
};

/// Collaborators shared by both sign-in flows.
#[derive(Debug, Clone)]
pub struct AuthDeps {
    /// Credential store: accounts.
    pub accounts: Arc<dyn AccountRepository>,
    /// Credential store: roles.
    pub roles: Arc<dyn RoleRepository>,
    /// Token issuer.
    pub issuer: Arc<TokenIssuer>,
    /// Ephemeral secret store.
    pub cache: Arc<CacheManager>,
    /// Notification sender.
    pub notifier: NotificationDispatcher,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl AuthDeps {
    /// Role assigned to `account`.
    pub(crate) async fn role_of(&self, account: &Account) -> AppResult<Role> {
        self.roles
            .find_by_id(account.role_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Role {} of account {} is missing",
                    account.role_id, account.id
                ))
            })
    }

    /// Issues a token pair for `account` and packages it with the sanitized
    /// account data.
    pub(crate) async fn open_session(&self, account: &Account) -> AppResult<SessionOutcome> {
        let role = self.role_of(account).await?;
        let tokens = self.issuer.issue(account, &role)?;
        Ok(SessionOutcome {
            account: AccountView::new(account, role.name),
            tokens,
        })
    }
}
