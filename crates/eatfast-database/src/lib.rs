//! # eatfast-database
//!
//! PostgreSQL connection management and the credential store: account and
//! role repositories behind traits, with Postgres implementations for
//! production and in-memory implementations for tests and local demos.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::{MemoryAccountRepository, MemoryRoleRepository};
pub use repositories::{AccountRepository, PgAccountRepository, PgRoleRepository, RoleRepository};
