//! Account repository: trait and PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;
use eatfast_core::types::AccountId;
use eatfast_entity::account::{Account, GoogleLink, NewAccount};

/// Unique index on `LOWER(email)`.
const EMAIL_UNIQUE: &str = "accounts_email_lower_key";
/// Unique index on `google_id`.
const GOOGLE_ID_UNIQUE: &str = "accounts_google_id_key";
/// CHECK constraint requiring a password hash or a Google id.
const CREDENTIAL_CHECK: &str = "accounts_has_credential";

/// Persistence operations on accounts.
///
/// Mutators that target a missing account fail with `NotFound`.
#[async_trait]
pub trait AccountRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account by primary key.
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>>;

    /// Find an account by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Find an account by Google subject id.
    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<Account>>;

    /// Insert a new account. Fails with `DuplicateAccount` when the email is
    /// taken and `AccountAlreadyLinked` when the Google id is taken.
    async fn create(&self, data: &NewAccount) -> AppResult<Account>;

    /// Store the failed-attempt counter and lock expiry.
    async fn record_failed_login(
        &self,
        id: AccountId,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Reset the failed-attempt counter and lock.
    async fn clear_failed_logins(&self, id: AccountId) -> AppResult<()>;

    /// Mark the account active and verified and stamp the last login.
    async fn activate(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<Account>;

    /// Stamp the last login.
    async fn touch_last_login(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<Account>;

    /// Attach a Google identity. Fails with `AccountAlreadyLinked` if another
    /// account holds it.
    async fn link_google(&self, id: AccountId, link: &GoogleLink) -> AppResult<Account>;

    /// Detach the Google identity and its profile fields. Fails with
    /// `LastCredential` if the account has no password.
    async fn unlink_google(&self, id: AccountId) -> AppResult<Account>;

    /// Replace the password hash and clear any lockout.
    async fn update_password(&self, id: AccountId, password_hash: &str) -> AppResult<()>;
}

/// PostgreSQL-backed account repository.
#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(e: sqlx::Error, context: &'static str) -> AppError {
        match e {
            sqlx::Error::Database(ref db) if db.constraint() == Some(EMAIL_UNIQUE) => {
                AppError::duplicate_account()
            }
            sqlx::Error::Database(ref db) if db.constraint() == Some(GOOGLE_ID_UNIQUE) => {
                AppError::account_already_linked()
            }
            sqlx::Error::Database(ref db) if db.constraint() == Some(CREDENTIAL_CHECK) => {
                AppError::new(
                    ErrorKind::LastCredential,
                    "Set a password before removing your only sign-in method",
                )
            }
            _ => AppError::with_source(ErrorKind::Database, context, e),
        }
    }

    fn missing(id: AccountId) -> AppError {
        AppError::not_found(format!("Account {id} not found"))
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by id", e)
            })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by email", e)
            })
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE google_id = $1")
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find account by Google id",
                    e,
                )
            })
    }

    async fn create(&self, data: &NewAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, email, password_hash, first_name, last_name, phone, \
                                   role_id, status, is_verified, google_id, profile_picture, provider) \
             VALUES ($1, LOWER($2), $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING *",
        )
        .bind(AccountId::new())
        .bind(data.email.trim())
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.phone)
        .bind(data.role_id)
        .bind(data.status)
        .bind(data.is_verified)
        .bind(&data.google_id)
        .bind(&data.profile_picture)
        .bind(data.provider)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, "Failed to create account"))
    }

    async fn record_failed_login(
        &self,
        id: AccountId,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET failed_login_attempts = $2, locked_until = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(attempts)
        .bind(locked_until)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record failed login", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(Self::missing(id));
        }
        Ok(())
    }

    async fn clear_failed_logins(&self, id: AccountId) -> AppResult<()> {
        sqlx::query(
            "UPDATE accounts SET failed_login_attempts = 0, locked_until = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reset failed logins", e)
        })?;
        Ok(())
    }

    async fn activate(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET status = 'active', is_verified = TRUE, last_login_at = $2, \
                                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to activate account", e))?
        .ok_or_else(|| Self::missing(id))
    }

    async fn touch_last_login(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET last_login_at = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
        })?
        .ok_or_else(|| Self::missing(id))
    }

    async fn link_google(&self, id: AccountId, link: &GoogleLink) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET google_id = $2, \
                                 profile_picture = COALESCE($3, profile_picture), \
                                 is_verified = is_verified OR $4, \
                                 status = CASE WHEN $4 AND status = 'pending' \
                                               THEN 'active'::account_status ELSE status END, \
                                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&link.google_id)
        .bind(&link.profile_picture)
        .bind(link.verify)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, "Failed to link Google account"))?
        .ok_or_else(|| Self::missing(id))
    }

    async fn unlink_google(&self, id: AccountId) -> AppResult<Account> {
        let updated = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET google_id = NULL, profile_picture = NULL, updated_at = NOW() \
             WHERE id = $1 AND password_hash IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, "Failed to unlink Google account"))?;

        match updated {
            Some(account) => Ok(account),
            None if self.find_by_id(id).await?.is_some() => Err(AppError::new(
                ErrorKind::LastCredential,
                "Set a password before removing your only sign-in method",
            )),
            None => Err(Self::missing(id)),
        }
    }

    async fn update_password(&self, id: AccountId, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $2, failed_login_attempts = 0, \
                                 locked_until = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?;

        if result.rows_affected() == 0 {
            return Err(Self::missing(id));
        }
        Ok(())
    }
}
