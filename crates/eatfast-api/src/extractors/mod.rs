//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod validated;

pub use auth::{AuthUser, MaybeAuthUser};
pub use client::ClientContext;
pub use validated::ValidatedJson;
