//! Invite code repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use sso_core::error::{AppError, ErrorKind};
use sso_core::result::AppResult;
use sso_core::types::UserId;
use sso_entity::InviteCode;

use crate::store::RedeemOutcome;

const INVITE_COLUMNS: &str = "id, generated_by, used_by, created_at, used_at";

/// Repository for invite code rows.
#[derive(Debug, Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Create a new invite repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fresh code.
    pub async fn insert(&self, invite: &InviteCode) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO invite_codes (id, generated_by, used_by, created_at, used_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&invite.id)
        .bind(invite.generated_by)
        .bind(invite.used_by)
        .bind(invite.created_at)
        .bind(invite.used_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("invite_codes_pkey") => {
                AppError::conflict("Invite code already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create invite code", e),
        })?;
        Ok(())
    }

    /// Find a code, used or not.
    pub async fn find(&self, code: &str) -> AppResult<Option<InviteCode>> {
        sqlx::query_as::<_, InviteCode>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invite_codes WHERE id = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find invite code", e))
    }

    /// All codes generated by `issuer`, newest first.
    pub async fn find_by_issuer(&self, issuer: UserId) -> AppResult<Vec<InviteCode>> {
        sqlx::query_as::<_, InviteCode>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invite_codes \
             WHERE generated_by = $1 ORDER BY created_at DESC"
        ))
        .bind(issuer)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list invite codes", e)
        })
    }

    /// Redeem on a pooled connection.
    pub async fn redeem(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::redeem_on(&mut conn, code, user_id, now).await
    }

    /// Compare-and-set `used_by` on the given connection.
    ///
    /// The `used_by IS NULL` predicate is what makes redemption at-most-once:
    /// concurrent updates of the same row serialize on its row lock and
    /// every loser re-evaluates the predicate against the committed value.
    pub async fn redeem_on(
        conn: &mut PgConnection,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        let result = sqlx::query(
            "UPDATE invite_codes SET used_by = $2, used_at = $3 \
             WHERE id = $1 AND used_by IS NULL",
        )
        .bind(code)
        .bind(user_id)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to redeem invite code", e))?;

        if result.rows_affected() == 1 {
            return Ok(RedeemOutcome::Redeemed);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM invite_codes WHERE id = $1)")
                .bind(code)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to look up invite code", e)
                })?;

        Ok(if exists {
            RedeemOutcome::AlreadyUsed
        } else {
            RedeemOutcome::NotFound
        })
    }
}
