//! Sign-in through an external identity provider.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use eatfast_auth::{ExternalIdentity, IdentityProvider, OAuthStateStore};
use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;
use eatfast_core::types::AccountId;
use eatfast_entity::account::{
    Account, AccountStatus, AccountView, AuthProvider, GoogleLink, NewAccount,
};
use eatfast_entity::role::{Role, RoleName};

use super::AuthDeps;
use super::types::{InitiateOutcome, OAuthOutcome};
use crate::context::RequestContext;
use crate::notification::Notification;

const PROVIDER_NAME: &str = "google";

/// OAuth initiation, callback reconciliation, and identity linking.
#[derive(Debug, Clone)]
pub struct OAuthService {
    deps: AuthDeps,
    provider: Arc<dyn IdentityProvider>,
    states: OAuthStateStore,
    client_url: String,
}

impl OAuthService {
    /// Creates the service. State nonces live for `state_ttl`; `client_url`
    /// prefixes the dashboard redirect.
    pub fn new(
        deps: AuthDeps,
        provider: Arc<dyn IdentityProvider>,
        state_ttl: Duration,
        client_url: impl Into<String>,
    ) -> Self {
        let states = OAuthStateStore::new(Arc::clone(&deps.cache), state_ttl, Arc::clone(&deps.clock));
        Self {
            deps,
            provider,
            states,
            client_url: client_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Stores a fresh state nonce and builds the provider URL carrying it.
    pub async fn initiate(&self, ctx: &RequestContext) -> AppResult<InitiateOutcome> {
        let state = self.states.create(ctx.ip_address.as_deref()).await?;
        let auth_url = self.provider.authorization_url(&state)?;
        Ok(InitiateOutcome { auth_url, state })
    }

    /// Completes a sign-in: consumes the state, exchanges the code and
    /// resolves the identity to an account.
    ///
    /// The identity is matched by provider subject first, then by email
    /// (linking it in place); otherwise a new account is created with the
    /// requested self-service role.
    pub async fn complete_callback(
        &self,
        code: &str,
        state: &str,
        requested_role: Option<&str>,
    ) -> AppResult<OAuthOutcome> {
        self.states.consume(state).await?;
        let identity = self.provider.exchange_code(code).await?;

        let (account, is_new_user) = match self.reconcile(&identity).await? {
            Some(account) => (account, false),
            None => (self.create_account(&identity, requested_role).await?, true),
        };

        if account.status.is_disabled() {
            return Err(AppError::account_inactive(format!(
                "Account is {}",
                account.status
            )));
        }

        let now = self.deps.clock.now();
        let account = if account.status == AccountStatus::Pending {
            self.deps.accounts.activate(account.id, now).await?
        } else {
            self.deps.accounts.touch_last_login(account.id, now).await?
        };

        let session = self.deps.open_session(&account).await?;
        let redirect_url = format!(
            "{}{}",
            self.client_url,
            session.account.role.dashboard_path()
        );

        info!(account_id = %account.id, is_new_user, "OAuth sign-in completed");
        Ok(OAuthOutcome {
            account: session.account,
            tokens: session.tokens,
            redirect_url,
            is_new_user,
        })
    }

    /// Attaches the provider identity behind `code` to the signed-in account.
    pub async fn link_account(
        &self,
        account_id: AccountId,
        code: &str,
        state: &str,
    ) -> AppResult<AccountView> {
        self.states.consume(state).await?;
        let identity = self.provider.exchange_code(code).await?;
        let account = self.find_account(account_id).await?;

        if let Some(owner) = self
            .deps
            .accounts
            .find_by_google_id(&identity.subject)
            .await?
        {
            if owner.id != account.id {
                warn!(account_id = %account.id, "Identity already linked to another account");
                return Err(AppError::account_already_linked());
            }
            return self.view(&owner).await;
        }

        if account.has_google_identity() {
            return Err(AppError::new(
                ErrorKind::AccountAlreadyLinked,
                "This account is already linked to another Google account",
            ));
        }

        let linked = self
            .deps
            .accounts
            .link_google(
                account.id,
                &GoogleLink {
                    google_id: identity.subject.clone(),
                    profile_picture: identity.picture.clone(),
                    verify: identity.email == account.email,
                },
            )
            .await?;
        self.notify_linked(&linked).await;

        info!(account_id = %linked.id, "Google identity linked");
        self.view(&linked).await
    }

    /// Detaches the provider identity. Refused with `LastCredential` when the
    /// account has no password to fall back on.
    pub async fn unlink_account(&self, account_id: AccountId) -> AppResult<AccountView> {
        let current = self.find_account(account_id).await?;
        if !current.has_password() {
            return Err(AppError::new(
                ErrorKind::LastCredential,
                "Set a password before removing your only sign-in method",
            ));
        }
        let account = self.deps.accounts.unlink_google(account_id).await?;

        info!(account_id = %account.id, "Google identity unlinked");
        self.view(&account).await
    }

    /// Roles a new OAuth user may pick.
    pub async fn available_roles(&self) -> AppResult<Vec<Role>> {
        self.deps.roles.list_by_names(&RoleName::SELF_ASSIGNABLE).await
    }

    async fn reconcile(&self, identity: &ExternalIdentity) -> AppResult<Option<Account>> {
        if let Some(account) = self
            .deps
            .accounts
            .find_by_google_id(&identity.subject)
            .await?
        {
            return Ok(Some(account));
        }

        let Some(account) = self.deps.accounts.find_by_email(&identity.email).await? else {
            return Ok(None);
        };
        if account.status.is_disabled() {
            return Ok(Some(account));
        }

        let linked = self
            .deps
            .accounts
            .link_google(
                account.id,
                &GoogleLink {
                    google_id: identity.subject.clone(),
                    profile_picture: identity.picture.clone(),
                    verify: true,
                },
            )
            .await?;
        self.notify_linked(&linked).await;

        info!(account_id = %linked.id, "Google identity linked by email");
        Ok(Some(linked))
    }

    async fn create_account(
        &self,
        identity: &ExternalIdentity,
        requested_role: Option<&str>,
    ) -> AppResult<Account> {
        let role_name = match requested_role.map(str::trim).filter(|r| !r.is_empty()) {
            None => RoleName::Customer,
            Some(requested) => RoleName::parse_self_assignable(requested).ok_or_else(|| {
                AppError::invalid_role(format!("Role '{requested}' cannot be selected"))
            })?,
        };
        let role = self
            .deps
            .roles
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| AppError::invalid_role(format!("Role '{role_name}' does not exist")))?;

        let account = self
            .deps
            .accounts
            .create(&NewAccount {
                email: identity.email.clone(),
                password_hash: None,
                first_name: identity.first_name.clone(),
                last_name: identity.last_name.clone(),
                phone: None,
                role_id: role.id,
                status: AccountStatus::Active,
                is_verified: true,
                google_id: Some(identity.subject.clone()),
                profile_picture: identity.picture.clone(),
                provider: AuthProvider::Google,
            })
            .await?;

        info!(account_id = %account.id, role = %role.name, "Account created from Google identity");
        Ok(account)
    }

    async fn find_account(&self, account_id: AccountId) -> AppResult<Account> {
        self.deps
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))
    }

    async fn view(&self, account: &Account) -> AppResult<AccountView> {
        let role = self.deps.role_of(account).await?;
        Ok(AccountView::new(account, role.name))
    }

    async fn notify_linked(&self, account: &Account) {
        self.deps
            .notifier
            .dispatch(Notification::AccountLinked {
                to: account.email.clone(),
                name: account.first_name.clone(),
                provider: PROVIDER_NAME.to_string(),
            })
            .await;
    }
}
