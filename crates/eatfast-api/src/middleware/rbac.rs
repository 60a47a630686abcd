//! RBAC helpers for handlers that need more than an authenticated caller.

use eatfast_core::result::AppResult;
use eatfast_core::types::AccountId;
use eatfast_entity::role::RoleName;

use crate::extractors::AuthUser;

/// Checks that the caller's role is one of `roles`.
pub fn require_roles(auth: &AuthUser, roles: &[RoleName]) -> AppResult<()> {
    auth.require_roles(roles)
}

/// Checks that the caller's role grants at least one of `permissions`.
pub fn require_permissions(auth: &AuthUser, permissions: &[&str]) -> AppResult<()> {
    auth.require_any_permission(permissions)
}

/// Checks that the caller owns the resource, or is an administrator.
pub fn require_ownership(auth: &AuthUser, owner: AccountId) -> AppResult<()> {
    auth.require_ownership(owner)
}

/// Checks that the caller is an administrator.
pub fn require_admin(auth: &AuthUser) -> AppResult<()> {
    require_roles(auth, &[RoleName::Admin])
}
