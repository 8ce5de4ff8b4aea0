//! User role management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sso_core::config::AppConfig;
use sso_core::error::AppError;
use sso_entity::{Role, UserPublic};
use sso_service::RequestContext;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Show a user
    Show {
        /// Exact email
        email: String,
    },
    /// Grant a role
    Grant {
        /// Exact email
        email: String,
        /// user, editor or admin
        role: Role,
    },
    /// Revoke a role
    Revoke {
        /// Exact email
        email: String,
        /// user, editor or admin
        role: Role,
    },
    /// Delete a user
    Delete {
        /// Exact email
        email: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// User display row
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    role: String,
    roles: String,
}

impl From<&UserPublic> for UserRow {
    fn from(user: &UserPublic) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            roles: user.permissions.to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::Services::connect(config).await?;
    let ctx = RequestContext::operator();

    match &args.command {
        UserCommand::Show { email } => {
            let user = services.admin.find_by_email(&ctx, email).await?;
            output::print_item(&UserRow::from(&user), format);
        }
        UserCommand::Grant { email, role } => {
            let user = services.admin.find_by_email(&ctx, email).await?;
            let updated = services.admin.grant_role(&ctx, user.id, *role).await?;
            output::print_item(&UserRow::from(&updated), format);
        }
        UserCommand::Revoke { email, role } => {
            let user = services.admin.find_by_email(&ctx, email).await?;
            let updated = services.admin.revoke_role(&ctx, user.id, *role).await?;
            output::print_item(&UserRow::from(&updated), format);
        }
        UserCommand::Delete { email, yes } => {
            let user = services.admin.find_by_email(&ctx, email).await?;
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete user '{}'? This cannot be undone.", user.email))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            services.admin.delete_user(&ctx, user.id).await?;
            output::print_success(&format!("User '{}' deleted", user.email));
        }
    }

    services.pool.close().await;
    Ok(())
}
