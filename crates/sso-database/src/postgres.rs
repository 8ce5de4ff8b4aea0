//! PostgreSQL-backed [`CredentialStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use sso_core::error::{AppError, ErrorKind};
use sso_core::result::AppResult;
use sso_core::types::UserId;
use sso_entity::{InviteCode, Permissions, User};

use crate::repositories::{InviteRepository, UserRepository};
use crate::store::{CredentialStore, RedeemOutcome};

/// Credential store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    users: UserRepository,
    invites: InviteRepository,
}

impl PgCredentialStore {
    /// Build the store and its repositories over one pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            invites: InviteRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        self.users.insert(user).await
    }

    async fn update_permissions(
        &self,
        id: UserId,
        permissions: Permissions,
    ) -> AppResult<Option<User>> {
        self.users.update_permissions(id, permissions).await
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        self.users.delete(id).await
    }

    async fn insert_invite(&self, invite: &InviteCode) -> AppResult<()> {
        self.invites.insert(invite).await
    }

    async fn find_invite(&self, code: &str) -> AppResult<Option<InviteCode>> {
        self.invites.find(code).await
    }

    async fn list_invites_by_issuer(&self, issuer: UserId) -> AppResult<Vec<InviteCode>> {
        self.invites.find_by_issuer(issuer).await
    }

    async fn redeem_invite(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        self.invites.redeem(code, user_id, now).await
    }

    async fn create_user_with_invite(
        &self,
        user: &User,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // A failure on either statement drops `tx`, which rolls back.
        UserRepository::insert_with(&mut *tx, user).await?;
        let outcome = InviteRepository::redeem_on(&mut tx, code, user.id, now).await?;

        if !outcome.is_redeemed() {
            debug!(user_id = %user.id, ?outcome, "Invite unavailable, rolling back registration");
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
            })?;
            return Ok(outcome);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit registration", e)
        })?;
        Ok(RedeemOutcome::Redeemed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
