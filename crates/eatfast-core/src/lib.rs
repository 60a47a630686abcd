//! # eatfast-core
//!
//! Core crate for the Eat Fast authentication service. Contains the
//! configuration schema, typed identifiers, the cache and clock traits,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Eat Fast crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
