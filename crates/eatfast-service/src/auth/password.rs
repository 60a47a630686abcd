//! Email and password sign-in with a mandatory second factor.
//!
//! Registration and login never hand out tokens directly: both end by
//! mailing a six-digit code, and tokens are only issued once that code is
//! verified.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use eatfast_auth::secret::{random_hex, sha256_hex};
use eatfast_auth::{OneTimeCodeStore, PasswordHasher, PasswordValidator};
use eatfast_cache::keys;
use eatfast_core::config::AuthConfig;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::CacheProvider;
use eatfast_core::types::AccountId;
use eatfast_entity::account::{Account, AccountStatus, AccountView, AuthProvider, NewAccount};
use eatfast_entity::role::RoleName;

use super::AuthDeps;
use super::types::{LoginOutcome, RegisterInput, RegisterOutcome, SessionOutcome};
use crate::context::RequestContext;
use crate::notification::Notification;

/// Password registration, login, second factor, refresh and recovery.
#[derive(Debug, Clone)]
pub struct PasswordAuthService {
    deps: AuthDeps,
    codes: OneTimeCodeStore,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    max_failed_attempts: i32,
    lockout: Duration,
    reset_ttl: StdDuration,
    client_url: String,
}

impl PasswordAuthService {
    /// Creates the service. `client_url` is the web client base used in
    /// password reset links.
    pub fn new(deps: AuthDeps, config: &AuthConfig, client_url: impl Into<String>) -> Self {
        let codes = OneTimeCodeStore::new(Arc::clone(&deps.cache), config);
        Self {
            deps,
            codes,
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(config),
            max_failed_attempts: config.max_failed_attempts,
            lockout: Duration::minutes(config.lockout_duration_minutes),
            reset_ttl: StdDuration::from_secs(config.reset_token_ttl_minutes * 60),
            client_url: client_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a pending account and mails its verification code.
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterOutcome> {
        let email = normalize_email(&input.email);
        self.validator.validate(&input.password)?;

        if self.deps.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::duplicate_account());
        }

        let role_name = RoleName::for_registration(input.role.as_deref());
        let role = self
            .deps
            .roles
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| AppError::internal(format!("Role '{role_name}' is not seeded")))?;

        let password_hash = self.hasher.hash(&input.password).await?;
        let account = self
            .deps
            .accounts
            .create(&NewAccount {
                email,
                password_hash: Some(password_hash),
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                phone: input.phone.filter(|p| !p.trim().is_empty()),
                role_id: role.id,
                status: AccountStatus::Pending,
                is_verified: false,
                google_id: None,
                profile_picture: None,
                provider: AuthProvider::Local,
            })
            .await?;

        self.send_code(&account).await?;

        info!(account_id = %account.id, role = %role.name, "Account registered");
        Ok(RegisterOutcome {
            account_id: account.id,
        })
    }

    /// Checks the password and mails a sign-in code.
    ///
    /// Unknown emails and wrong passwords fail identically. Each wrong
    /// password counts towards the lockout threshold.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> AppResult<LoginOutcome> {
        let email = normalize_email(email);
        let Some(account) = self.deps.accounts.find_by_email(&email).await? else {
            debug!(ip = ?ctx.ip_address, "Login for unknown email");
            return Err(AppError::invalid_credentials());
        };

        let now = self.deps.clock.now();
        if account.is_locked_at(now) {
            warn!(account_id = %account.id, ip = ?ctx.ip_address, "Login refused: account locked");
            return Err(AppError::account_locked());
        }

        let Some(hash) = account.password_hash.as_deref().filter(|h| !h.is_empty()) else {
            debug!(account_id = %account.id, "Password login for an account without password");
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.verify(password, hash).await? {
            self.record_failure(&account, now, ctx).await?;
            return Err(AppError::invalid_credentials());
        }

        if account.status.is_disabled() {
            return Err(AppError::account_inactive(format!(
                "Account is {}",
                account.status
            )));
        }

        if account.failed_login_attempts > 0 || account.locked_until.is_some() {
            self.deps.accounts.clear_failed_logins(account.id).await?;
        }

        self.send_code(&account).await?;

        info!(account_id = %account.id, ip = ?ctx.ip_address, "Password accepted, code sent");
        Ok(LoginOutcome {
            account_id: account.id,
            requires_two_factor: true,
        })
    }

    /// Consumes the live code, activates the account and issues tokens.
    pub async fn verify_two_factor(
        &self,
        account_id: AccountId,
        code: &str,
    ) -> AppResult<SessionOutcome> {
        self.codes.verify(account_id, code.trim()).await?;

        let account = self.find_account(account_id).await?;
        if account.status.is_disabled() {
            return Err(AppError::account_inactive(format!(
                "Account is {}",
                account.status
            )));
        }

        let account = self
            .deps
            .accounts
            .activate(account.id, self.deps.clock.now())
            .await?;
        let session = self.deps.open_session(&account).await?;

        info!(account_id = %account.id, "Second factor verified");
        Ok(session)
    }

    /// Replaces the live code with a new one and mails it.
    pub async fn resend_two_factor(&self, account_id: AccountId) -> AppResult<()> {
        let account = self.find_account(account_id).await?;
        if account.status.is_disabled() {
            return Err(AppError::account_inactive(format!(
                "Account is {}",
                account.status
            )));
        }
        self.send_code(&account).await
    }

    /// Issues a new token pair for a valid refresh token.
    ///
    /// The presented refresh token is not revoked.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<SessionOutcome> {
        let claims = self.deps.issuer.verify_refresh(refresh_token)?;

        let account = self
            .deps
            .accounts
            .find_by_id(claims.account_id)
            .await?
            .ok_or_else(|| AppError::token_invalid("Account no longer exists"))?;
        if !account.status.is_active() {
            return Err(AppError::token_invalid("Account is not active"));
        }

        self.deps.open_session(&account).await
    }

    /// Drops ephemeral sign-in artifacts. Never fails.
    pub async fn logout(&self, account_id: AccountId) {
        if let Err(e) = self.codes.discard(account_id).await {
            warn!(account_id = %account_id, error = %e, "Failed to clear pending code on logout");
        }
        info!(account_id = %account_id, "Logged out");
    }

    /// Mails a single-use reset link when the email belongs to an account.
    ///
    /// Always succeeds so the response does not reveal whether the email is
    /// registered.
    pub async fn forgot_password(&self, email: &str) {
        if let Err(e) = self.issue_reset_link(&normalize_email(email)).await {
            warn!(error = %e, "Failed to issue password reset link");
        }
    }

    /// Sets a new password using a reset token from [`forgot_password`].
    ///
    /// [`forgot_password`]: Self::forgot_password
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        self.validator.validate(new_password)?;

        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::invalid_reset_token());
        }

        let account_id = self
            .deps
            .cache
            .take(&keys::password_reset(&sha256_hex(token)))
            .await?
            .and_then(|raw| raw.parse::<AccountId>().ok())
            .ok_or_else(AppError::invalid_reset_token)?;
        let account = self
            .deps
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(AppError::invalid_reset_token)?;

        let hash = self.hasher.hash(new_password).await?;
        self.deps.accounts.update_password(account.id, &hash).await?;

        if let Err(e) = self.codes.discard(account.id).await {
            warn!(account_id = %account.id, error = %e, "Failed to clear pending code after reset");
        }

        self.deps
            .notifier
            .dispatch(Notification::PasswordChanged {
                to: account.email.clone(),
                name: account.first_name.clone(),
            })
            .await;

        info!(account_id = %account.id, "Password reset");
        Ok(())
    }

    /// Sanitized data of the signed-in account.
    pub async fn profile(&self, account_id: AccountId) -> AppResult<AccountView> {
        let account = self.find_account(account_id).await?;
        let role = self.deps.role_of(&account).await?;
        Ok(AccountView::new(&account, role.name))
    }

    async fn find_account(&self, account_id: AccountId) -> AppResult<Account> {
        self.deps
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))
    }

    /// Issues a code and mails it: a verification code while the account is
    /// pending, a login code afterwards.
    async fn send_code(&self, account: &Account) -> AppResult<()> {
        let code = self.codes.issue(account.id).await?;
        let notification = if account.status == AccountStatus::Pending {
            Notification::VerificationCode {
                to: account.email.clone(),
                name: account.first_name.clone(),
                code,
            }
        } else {
            Notification::LoginCode {
                to: account.email.clone(),
                name: account.first_name.clone(),
                code,
            }
        };
        self.deps.notifier.dispatch(notification).await;
        Ok(())
    }

    // Read-modify-write without compare-and-swap: concurrent failures can
    // under-count.
    async fn record_failure(
        &self,
        account: &Account,
        now: DateTime<Utc>,
        ctx: &RequestContext,
    ) -> AppResult<()> {
        let lock_elapsed = account.locked_until.is_some_and(|until| until <= now);
        let previous = if lock_elapsed {
            0
        } else {
            account.failed_login_attempts
        };
        let attempts = previous + 1;
        let locked_until = (attempts >= self.max_failed_attempts).then(|| now + self.lockout);

        self.deps
            .accounts
            .record_failed_login(account.id, attempts, locked_until)
            .await?;

        if locked_until.is_some() {
            warn!(account_id = %account.id, attempts, ip = ?ctx.ip_address, "Account locked");
        } else {
            debug!(account_id = %account.id, attempts, "Wrong password");
        }
        Ok(())
    }

    async fn issue_reset_link(&self, email: &str) -> AppResult<()> {
        let Some(account) = self.deps.accounts.find_by_email(email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };
        if account.status.is_disabled() {
            debug!(account_id = %account.id, "Password reset requested for disabled account");
            return Ok(());
        }

        let token = random_hex(32);
        self.deps
            .cache
            .set(
                &keys::password_reset(&sha256_hex(&token)),
                &account.id.to_string(),
                self.reset_ttl,
            )
            .await?;

        self.deps
            .notifier
            .dispatch(Notification::PasswordReset {
                to: account.email.clone(),
                name: account.first_name.clone(),
                reset_url: format!("{}/reset-password?token={token}", self.client_url),
            })
            .await;

        info!(account_id = %account.id, "Password reset link sent");
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
