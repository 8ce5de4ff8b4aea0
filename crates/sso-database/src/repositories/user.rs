//! User repository implementation.

use sqlx::{Executor, PgPool, Postgres};

use sso_core::error::{AppError, ErrorKind};
use sso_core::result::AppResult;
use sso_core::types::UserId;
use sso_entity::{Permissions, User};

const USER_COLUMNS: &str = "id, email, password_hash, permissions, created_at";

/// Repository for user rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by exact email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Insert a user.
    pub async fn insert(&self, user: &User) -> AppResult<()> {
        Self::insert_with(&self.pool, user).await
    }

    /// Insert a user through any executor, so the insert can join a
    /// caller's transaction.
    pub async fn insert_with<'e, E>(executor: E, user: &User) -> AppResult<()>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, permissions, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.permissions)
        .bind(user.created_at)
        .execute(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
                AppError::conflict("Email already registered")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })?;
        Ok(())
    }

    /// Overwrite the permission mask.
    pub async fn update_permissions(
        &self,
        id: UserId,
        permissions: Permissions,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET permissions = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(permissions)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update user permissions", e)
        })
    }

    /// Delete a user.
    pub async fn delete(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }
}
