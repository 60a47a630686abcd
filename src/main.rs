//! Eat Fast authentication server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use eatfast_api::{AppState, StateParts, build_app};
use eatfast_auth::{GoogleIdentityProvider, IdentityProvider};
use eatfast_cache::CacheManager;
use eatfast_core::config::AppConfig;
use eatfast_core::error::AppError;
use eatfast_core::traits::SystemClock;
use eatfast_database::{DatabasePool, PgAccountRepository, PgRoleRepository};
use eatfast_service::{LogNotifier, Notifier, SmtpNotifier};

#[tokio::main]
async fn main() {
    let env = std::env::var("EATFAST_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Eat Fast auth v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    let accounts = Arc::new(PgAccountRepository::new(db.pool()));
    let roles = Arc::new(PgRoleRepository::new(db.pool()));

    // ── Step 2: Ephemeral secret store ───────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 3: Notifications ────────────────────────────────────
    let notifier: Arc<dyn Notifier> = if config.mail.enabled {
        tracing::info!(host = %config.mail.smtp_host, "Mail delivery via SMTP");
        Arc::new(SmtpNotifier::new(&config.mail)?)
    } else {
        tracing::warn!("Mail delivery disabled, notifications are only logged");
        Arc::new(LogNotifier)
    };

    // ── Step 4: Identity provider ────────────────────────────────
    let identity_provider: Option<Arc<dyn IdentityProvider>> = if config.oauth.google.enabled {
        Some(Arc::new(GoogleIdentityProvider::new(&config.oauth.google)?))
    } else {
        tracing::info!("Google sign-in disabled");
        None
    };

    // ── Step 5: HTTP application ─────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(StateParts {
        config,
        accounts,
        roles,
        cache,
        notifier,
        identity_provider,
        clock: Arc::new(SystemClock),
    });
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Eat Fast auth server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
