//! # eatfast-entity
//!
//! Domain entity models for the Eat Fast authentication service. Every
//! struct in this crate represents a database table row or a domain value
//! object. Row types additionally derive `sqlx::FromRow`.

pub mod account;
pub mod role;

pub use account::{Account, AccountStatus, AccountView, AuthProvider, GoogleLink, NewAccount};
pub use role::{Role, RoleName};
