//! Route definitions for the Eat Fast HTTP API.
//!
//! All routes are mounted under `/api` and grouped by rate-limit tier.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware::rate_limit::{self, RateLimitTier, TierLimit};
use crate::state::AppState;

/// Build the API router and thread `state` through every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(strict_routes(&state))
        .merge(moderate_routes(&state))
        .merge(lenient_routes(&state))
        .route("/health", get(handlers::health::health));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Credential-guessing endpoints.
fn strict_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/verify-2fa", post(handlers::auth::verify_two_factor))
        .route("/auth/resend-2fa", post(handlers::auth::resend_two_factor))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route_layer(axum_middleware::from_fn_with_state(
            TierLimit::new(state.rate_limiter.clone(), RateLimitTier::Strict),
            rate_limit::enforce,
        ))
}

/// Token and Google endpoints.
fn moderate_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/google/init", get(handlers::oauth::init))
        .route("/auth/google/callback", post(handlers::oauth::callback))
        .route("/auth/google/link", post(handlers::oauth::link))
        .route("/auth/google/unlink", delete(handlers::oauth::unlink))
        .route_layer(axum_middleware::from_fn_with_state(
            TierLimit::new(state.rate_limiter.clone(), RateLimitTier::Moderate),
            rate_limit::enforce,
        ))
}

/// Reads and session teardown.
fn lenient_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/google/roles", get(handlers::oauth::roles))
        .route_layer(axum_middleware::from_fn_with_state(
            TierLimit::new(state.rate_limiter.clone(), RateLimitTier::Lenient),
            rate_limit::enforce,
        ))
}
