//! CLI command definitions and dispatch.

pub mod invite;
pub mod migrate;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use sso_auth::{InviteLedger, RbacEnforcer, StoreDeadline};
use sso_core::config::AppConfig;
use sso_core::error::AppError;
use sso_core::traits::SystemClock;
use sso_database::{CredentialStore, DatabasePool, PgCredentialStore};
use sso_service::{AdminUserService, InviteService};

use crate::output::OutputFormat;

/// Pragma SSO administration
#[derive(Debug, Parser)]
#[command(name = "sso-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (selects config/{env}.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Invite code management
    Invite(invite::InviteArgs),
    /// User role management
    User(user::UserArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Invite(args) => invite::execute(args, &config, self.format).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
        }
    }
}

/// Services the invite and user commands run against.
pub struct Services {
    /// Connection pool, closed when the command finishes.
    pub pool: DatabasePool,
    /// Invite ledger, for issuer-scoped operations the service does not expose.
    pub ledger: Arc<InviteLedger>,
    /// Role-checked invite operations.
    pub invites: InviteService,
    /// Role-checked user administration.
    pub admin: AdminUserService,
}

impl Services {
    /// Connects to the database and wires the services over it.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let pool = DatabasePool::connect(&config.database).await?;
        let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.pool().clone()));
        let deadline = StoreDeadline::from_config(&config.auth);
        let rbac = RbacEnforcer::new();

        let ledger = Arc::new(InviteLedger::new(
            Arc::clone(&store),
            Arc::new(SystemClock),
            deadline,
        ));

        Ok(Self {
            invites: InviteService::new(Arc::clone(&ledger), rbac),
            admin: AdminUserService::new(store, rbac, deadline),
            ledger,
            pool,
        })
    }
}
