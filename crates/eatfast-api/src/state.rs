//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use eatfast_auth::{AccessGuard, IdentityProvider, TokenIssuer};
use eatfast_cache::CacheManager;
use eatfast_core::config::AppConfig;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::Clock;
use eatfast_database::{AccountRepository, RoleRepository};
use eatfast_service::{
    AuthDeps, NotificationDispatcher, Notifier, OAuthService, PasswordAuthService,
};

use crate::middleware::rate_limit::RateLimiter;

/// Infrastructure the state is assembled from.
///
/// The binary fills this with Postgres, Redis or moka, SMTP and Google;
/// tests fill it with in-memory stand-ins.
#[derive(Debug, Clone)]
pub struct StateParts {
    pub config: AppConfig,
    pub accounts: Arc<dyn AccountRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub cache: Arc<CacheManager>,
    pub notifier: Arc<dyn Notifier>,
    /// `None` disables the Google routes.
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
    pub clock: Arc<dyn Clock>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Ephemeral secret store (Redis or in-memory)
    pub cache: Arc<CacheManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token issuer
    pub issuer: Arc<TokenIssuer>,
    /// Bearer-token admission
    pub guard: Arc<AccessGuard>,
    /// Fixed-window request limiter
    pub rate_limiter: RateLimiter,

    // ── Services ─────────────────────────────────────────────
    /// Password sign-in flow
    pub password_auth: Arc<PasswordAuthService>,
    /// Google sign-in flow, when enabled
    pub oauth: Option<Arc<OAuthService>>,
}

impl AppState {
    /// Wires services from their infrastructure.
    pub fn new(parts: StateParts) -> Self {
        let config = Arc::new(parts.config);
        let issuer = Arc::new(TokenIssuer::new(&config.auth, Arc::clone(&parts.clock)));

        let guard = Arc::new(AccessGuard::new(
            Arc::clone(&issuer),
            Arc::clone(&parts.accounts),
            Arc::clone(&parts.roles),
            Arc::clone(&parts.clock),
        ));

        let deps = AuthDeps {
            accounts: parts.accounts,
            roles: parts.roles,
            issuer: Arc::clone(&issuer),
            cache: Arc::clone(&parts.cache),
            notifier: NotificationDispatcher::new(parts.notifier),
            clock: parts.clock,
        };

        let password_auth = Arc::new(PasswordAuthService::new(
            deps.clone(),
            &config.auth,
            config.server.client_url.clone(),
        ));

        let oauth = parts.identity_provider.map(|provider| {
            Arc::new(OAuthService::new(
                deps,
                provider,
                Duration::from_secs(config.oauth.google.state_ttl_seconds),
                config.server.client_url.clone(),
            ))
        });

        let rate_limiter = RateLimiter::new(Arc::clone(&parts.cache), config.rate_limit.clone());

        Self {
            config,
            cache: parts.cache,
            issuer,
            guard,
            rate_limiter,
            password_auth,
            oauth,
        }
    }

    /// The Google flow, or `NotFound` when it is disabled.
    pub fn oauth(&self) -> AppResult<&OAuthService> {
        self.oauth
            .as_deref()
            .ok_or_else(|| AppError::not_found("Google sign-in is not enabled"))
    }
}
