//! Axum middleware stack.

pub mod cors;
pub mod error_detail;
pub mod logging;
pub mod rate_limit;
pub mod rbac;
