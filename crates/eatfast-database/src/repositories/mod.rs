//! Credential store repositories.

pub mod account;
pub mod role;

pub use account::{AccountRepository, PgAccountRepository};
pub use role::{PgRoleRepository, RoleRepository};
