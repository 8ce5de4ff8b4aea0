//! Pragma SSO server.
//!
//! Main entry point that loads configuration, prepares the database and
//! starts the HTTP API.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use sso_api::AppState;
use sso_core::config::AppConfig;
use sso_core::error::AppError;
use sso_core::traits::SystemClock;
use sso_database::connection::mask_password;
use sso_database::{DatabasePool, PgCredentialStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("SSO_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Configuration loaded (env: {})", env);

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
    tracing::info!("Starting Pragma SSO v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database at {}...", mask_password(&config.database.url));
    let db = DatabasePool::connect(&config.database).await?;

    if config.database.migrate_on_start {
        tracing::info!("Running database migrations...");
        sso_database::migration::run_migrations(db.pool()).await?;
        tracing::info!("Database migrations complete");
    }

    // ── Step 2: Services ─────────────────────────────────────────
    let store = Arc::new(PgCredentialStore::new(db.pool().clone()));
    let state = AppState::new(config, store, Arc::new(SystemClock))?;

    // ── Step 3: HTTP server until shutdown ───────────────────────
    let result = sso_api::serve(state).await;

    db.close().await;
    tracing::info!("Database pool closed");
    result
}
