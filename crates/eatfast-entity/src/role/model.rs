//! Role entity model.

use serde::{Deserialize, Serialize};

use eatfast_core::types::RoleId;

use super::name::RoleName;

/// Permission that grants every other permission.
pub const WILDCARD_PERMISSION: &str = "*";

/// A named permission bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Role name.
    pub name: RoleName,
    /// Human-readable description.
    pub description: Option<String>,
    /// Granted permission strings such as `orders:read`.
    pub permissions: Vec<String>,
}

impl Role {
    /// Whether the role grants `permission`, directly or via `*`.
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == WILDCARD_PERMISSION || p == permission)
    }
}
