//! The credential store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sso_core::result::AppResult;
use sso_core::types::UserId;
use sso_entity::{InviteCode, Permissions, User};

/// Result of a compare-and-set on an invite's `used_by` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The code was unused and is now bound to the user.
    Redeemed,
    /// The code exists but somebody already redeemed it.
    AlreadyUsed,
    /// No such code.
    NotFound,
}

impl RedeemOutcome {
    /// Whether the redemption took effect.
    pub fn is_redeemed(self) -> bool {
        matches!(self, Self::Redeemed)
    }
}

/// Durable storage for users and invite codes.
///
/// Implementations must be safe to call from many tasks at once and must
/// uphold two rules under concurrency: emails are unique, and an invite's
/// `used_by` is set at most once.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Point lookup by id.
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Point lookup by exact email.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a user. Fails with `Conflict` if the email is taken.
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    /// Overwrite a user's permission mask. Returns the updated user, or
    /// `None` if it does not exist.
    async fn update_permissions(
        &self,
        id: UserId,
        permissions: Permissions,
    ) -> AppResult<Option<User>>;

    /// Delete a user. Returns whether a row was removed.
    async fn delete_user(&self, id: UserId) -> AppResult<bool>;

    /// Insert a fresh invite code. Fails with `Conflict` on a duplicate code.
    async fn insert_invite(&self, invite: &InviteCode) -> AppResult<()>;

    /// Point lookup by code, used or not.
    async fn find_invite(&self, code: &str) -> AppResult<Option<InviteCode>>;

    /// All codes generated by the issuer, newest first.
    async fn list_invites_by_issuer(&self, issuer: UserId) -> AppResult<Vec<InviteCode>>;

    /// Atomically set `used_by`/`used_at` if and only if the code is unused.
    async fn redeem_invite(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome>;

    /// Insert `user` and redeem `code` for it as one atomic unit.
    ///
    /// On any outcome other than [`RedeemOutcome::Redeemed`] nothing is
    /// written. A duplicate email fails with `Conflict`, also writing
    /// nothing.
    async fn create_user_with_invite(
        &self,
        user: &User,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome>;

    /// Whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
