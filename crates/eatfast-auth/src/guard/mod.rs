//! Per-request admission.
//!
//! A request walks `Unauthenticated → TokenPresent → TokenValid →
//! AccountActive → RoleAuthorized → PermissionAuthorized → Admitted`; the
//! first failed transition short-circuits with its error.

pub mod policy;
pub mod principal;

use std::sync::Arc;

use tracing::debug;

use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;
use eatfast_core::traits::Clock;
use eatfast_database::{AccountRepository, RoleRepository};
use eatfast_entity::account::AccountStatus;

use crate::jwt::TokenIssuer;

pub use policy::AccessPolicy;
pub use principal::Principal;

/// Validates bearer tokens and enforces role and permission predicates.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    issuer: Arc<TokenIssuer>,
    accounts: Arc<dyn AccountRepository>,
    roles: Arc<dyn RoleRepository>,
    clock: Arc<dyn Clock>,
}

impl AccessGuard {
    /// Creates a guard over the given token issuer and credential store.
    pub fn new(
        issuer: Arc<TokenIssuer>,
        accounts: Arc<dyn AccountRepository>,
        roles: Arc<dyn RoleRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer,
            accounts,
            roles,
            clock,
        }
    }

    /// Admits the request or returns the error of the first failed stage.
    pub async fn admit(&self, bearer: Option<&str>, policy: &AccessPolicy) -> AppResult<Principal> {
        let token = bearer
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthenticated("Access token required"))?;

        let claims = self.issuer.verify_access(token)?;

        let account = self
            .accounts
            .find_by_id(claims.account_id)
            .await?
            .ok_or_else(|| AppError::token_invalid("Account no longer exists"))?;

        if account.is_locked_at(self.clock.now()) {
            return Err(AppError::account_locked());
        }
        if account.status != AccountStatus::Active {
            return Err(AppError::account_inactive(format!(
                "Account is {}",
                account.status
            )));
        }

        let role = self
            .roles
            .find_by_id(account.role_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("Role {} of account {} is missing", account.role_id, account.id))
            })?;

        let principal = Principal {
            account_id: account.id,
            email: account.email,
            role: role.name,
            permissions: role.permissions,
        };
        principal.require_roles(&policy.roles)?;
        principal.require_any_permission(&policy.permissions)?;

        debug!(account_id = %principal.account_id, role = %principal.role, "Request admitted");
        Ok(principal)
    }

    /// Like [`admit`](Self::admit), but a missing, expired or invalid token
    /// admits the request anonymously instead of rejecting it.
    pub async fn admit_optional(
        &self,
        bearer: Option<&str>,
        policy: &AccessPolicy,
    ) -> AppResult<Option<Principal>> {
        match self.admit(bearer, policy).await {
            Ok(principal) => Ok(Some(principal)),
            Err(e)
                if matches!(
                    e.kind,
                    ErrorKind::Unauthenticated | ErrorKind::TokenExpired | ErrorKind::TokenInvalid
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
