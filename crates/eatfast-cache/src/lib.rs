//! # eatfast-cache
//!
//! Backends for the ephemeral secret store: two-factor codes, OAuth state
//! nonces, password reset tokens and rate-limit counters. Supports two modes:
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//!   with per-entry expiry
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate,
//!   required when several instances share secrets
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
