//! Declarative admission requirements for a route.

use eatfast_entity::role::RoleName;

/// What a request must satisfy beyond holding a valid token for an active
/// account. Empty lists impose no requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// The caller's role must be one of these.
    pub roles: Vec<RoleName>,
    /// The caller's role must grant at least one of these.
    pub permissions: Vec<String>,
}

impl AccessPolicy {
    /// Any authenticated, active account.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Restrict to the given roles.
    pub fn with_roles(mut self, roles: &[RoleName]) -> Self {
        self.roles = roles.to_vec();
        self
    }

    /// Require any one of the given permissions.
    pub fn with_any_permission(mut self, permissions: &[&str]) -> Self {
        self.permissions = permissions.iter().map(|p| p.to_string()).collect();
        self
    }
}
