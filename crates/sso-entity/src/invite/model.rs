//! Invite code model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sso_core::types::UserId;

/// A single-use invite code.
///
/// `used_by` and `used_at` go from empty to set exactly once, in the same
/// atomic step. Once set, the code is inert forever. Codes are never
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InviteCode {
    /// The redeemable code itself. Also the primary key.
    pub id: String,
    /// Issuing user, or `None` for system-issued codes.
    pub generated_by: Option<UserId>,
    /// The user who redeemed the code.
    pub used_by: Option<UserId>,
    /// When the code was generated.
    pub created_at: DateTime<Utc>,
    /// When the code was redeemed.
    pub used_at: Option<DateTime<Utc>>,
}

impl InviteCode {
    /// A fresh, unredeemed code.
    pub fn new(id: impl Into<String>, generated_by: Option<UserId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            generated_by,
            used_by: None,
            created_at,
            used_at: None,
        }
    }

    /// Whether the code has already been redeemed.
    pub fn is_used(&self) -> bool {
        self.used_by.is_some()
    }

    /// Mark the code as redeemed. Returns `false`, leaving the code
    /// untouched, if it was already used.
    pub fn mark_used(&mut self, user_id: UserId, at: DateTime<Utc>) -> bool {
        if self.is_used() {
            return false;
        }
        self.used_by = Some(user_id);
        self.used_at = Some(at);
        true
    }
}
