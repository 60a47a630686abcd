//! # eatfast-api
//!
//! HTTP layer of the Eat Fast authentication service.
//!
//! ## Modules
//!
//! - `router` : routes under `/api`, grouped by rate-limit tier
//! - `handlers` : password and Google sign-in endpoints, health
//! - `extractors` : `AuthUser`, `MaybeAuthUser`, `ClientContext`, `ValidatedJson`
//! - `middleware` : rate limiting, CORS, request logging, RBAC helpers
//! - `error` : `AppError` to HTTP response mapping

pub mod app;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::{AppState, StateParts};
