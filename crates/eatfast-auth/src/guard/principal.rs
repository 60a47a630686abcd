//! The admitted caller.

use serde::Serialize;

use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::types::AccountId;
use eatfast_entity::role::{RoleName, WILDCARD_PERMISSION};

/// Identity attached to a request once the guard has admitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Authenticated account.
    pub account_id: AccountId,
    /// Account email.
    pub email: String,
    /// Current role, read from the store rather than the token.
    pub role: RoleName,
    /// Current permissions of the role.
    pub permissions: Vec<String>,
}

impl Principal {
    /// Whether the role grants `permission` directly or through `*`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == WILDCARD_PERMISSION || p == permission)
    }

    /// Fails with `InsufficientPermissions` unless the role is listed.
    pub fn require_roles(&self, roles: &[RoleName]) -> AppResult<()> {
        if roles.is_empty() || roles.contains(&self.role) {
            return Ok(());
        }
        let required: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        Err(AppError::insufficient_permissions(
            "Insufficient role",
            &required,
            &[self.role.to_string()],
        ))
    }

    /// Fails with `InsufficientPermissions` unless at least one permission
    /// is granted.
    pub fn require_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> AppResult<()> {
        if permissions.is_empty() || permissions.iter().any(|p| self.has_permission(p.as_ref())) {
            return Ok(());
        }
        let required: Vec<String> = permissions.iter().map(|p| p.as_ref().to_string()).collect();
        Err(AppError::insufficient_permissions(
            "Insufficient permissions",
            &required,
            &self.permissions,
        ))
    }

    /// Fails with `ResourceAccessDenied` unless the caller owns the resource
    /// or is an administrator.
    pub fn require_ownership(&self, owner: AccountId) -> AppResult<()> {
        if self.role.is_admin() || self.account_id == owner {
            Ok(())
        } else {
            Err(AppError::resource_access_denied())
        }
    }
}
