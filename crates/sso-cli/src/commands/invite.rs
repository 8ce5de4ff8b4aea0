//! Invite code commands.
//!
//! `invite create` without `--issuer` produces a system-issued code, which is
//! how the first account on a fresh deployment gets in.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sso_core::config::AppConfig;
use sso_core::error::AppError;
use sso_core::types::UserId;
use sso_entity::InviteCode;
use sso_service::RequestContext;

use crate::output::{self, OutputFormat};

/// Arguments for invite commands
#[derive(Debug, Args)]
pub struct InviteArgs {
    /// Invite subcommand
    #[command(subcommand)]
    pub command: InviteCommand,
}

/// Invite subcommands
#[derive(Debug, Subcommand)]
pub enum InviteCommand {
    /// Generate a new invite code
    Create {
        /// Record this user as the issuer
        #[arg(long)]
        issuer: Option<UserId>,
    },
    /// Show one invite code
    Show {
        /// The code
        code: String,
    },
    /// List codes generated by a user
    List {
        /// Issuing user id
        #[arg(long)]
        issuer: UserId,
    },
}

/// Invite display row
#[derive(Debug, Serialize, Tabled)]
struct InviteRow {
    code: String,
    generated_by: String,
    used_by: String,
    created_at: String,
    used_at: String,
}

impl From<&InviteCode> for InviteRow {
    fn from(invite: &InviteCode) -> Self {
        let or_dash = |id: Option<UserId>| id.map_or_else(|| "-".to_string(), |id| id.to_string());
        Self {
            code: invite.id.clone(),
            generated_by: or_dash(invite.generated_by),
            used_by: or_dash(invite.used_by),
            created_at: invite.created_at.format("%Y-%m-%d %H:%M").to_string(),
            used_at: invite
                .used_at
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

/// Execute invite commands
pub async fn execute(
    args: &InviteArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::Services::connect(config).await?;
    let ctx = RequestContext::operator();

    match &args.command {
        InviteCommand::Create { issuer: None } => {
            let invite = services.invites.create(&ctx).await?;
            output::print_item(&InviteRow::from(&invite), format);
        }
        InviteCommand::Create {
            issuer: Some(issuer),
        } => {
            services.admin.get_user(&ctx, *issuer).await?;
            let invite = services.ledger.generate(Some(*issuer)).await?;
            output::print_item(&InviteRow::from(&invite), format);
        }
        InviteCommand::Show { code } => {
            let invite = services.invites.lookup(&ctx, code).await?;
            output::print_item(&InviteRow::from(&invite), format);
        }
        InviteCommand::List { issuer } => {
            let invites = services.ledger.issued_by(*issuer).await?;
            let rows: Vec<InviteRow> = invites.iter().map(InviteRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    services.pool.close().await;
    Ok(())
}
