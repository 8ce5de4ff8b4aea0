//! In-memory credential store using a Tokio mutex for single-node use.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use sso_core::error::AppError;
use sso_core::result::AppResult;
use sso_core::types::UserId;
use sso_entity::{InviteCode, Permissions, User};

use crate::store::{CredentialStore, RedeemOutcome};

#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<UserId, User>,
    emails: HashMap<String, UserId>,
    invites: HashMap<String, InviteCode>,
}

impl InnerState {
    fn insert_user(&mut self, user: &User) -> AppResult<()> {
        if self.emails.contains_key(&user.email) {
            return Err(AppError::conflict("Email already registered"));
        }
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn redeem(&mut self, code: &str, user_id: UserId, now: DateTime<Utc>) -> RedeemOutcome {
        match self.invites.get_mut(code) {
            None => RedeemOutcome::NotFound,
            Some(invite) => {
                if invite.mark_used(user_id, now) {
                    RedeemOutcome::Redeemed
                } else {
                    RedeemOutcome::AlreadyUsed
                }
            }
        }
    }
}

/// In-memory credential store.
///
/// One mutex guards both tables, so every method (including the combined
/// create-and-redeem) is atomic with respect to every other. Clones share
/// state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        self.state.lock().await.insert_user(user)
    }

    async fn update_permissions(
        &self,
        id: UserId,
        permissions: Permissions,
    ) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.permissions = permissions;
            user.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(user) = state.users.remove(&id) else {
            return Ok(false);
        };
        state.emails.remove(&user.email);
        for invite in state.invites.values_mut() {
            if invite.generated_by == Some(id) {
                invite.generated_by = None;
            }
        }
        Ok(true)
    }

    async fn insert_invite(&self, invite: &InviteCode) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.invites.contains_key(&invite.id) {
            return Err(AppError::conflict("Invite code already exists"));
        }
        state.invites.insert(invite.id.clone(), invite.clone());
        Ok(())
    }

    async fn find_invite(&self, code: &str) -> AppResult<Option<InviteCode>> {
        Ok(self.state.lock().await.invites.get(code).cloned())
    }

    async fn list_invites_by_issuer(&self, issuer: UserId) -> AppResult<Vec<InviteCode>> {
        let state = self.state.lock().await;
        let mut invites: Vec<InviteCode> = state
            .invites
            .values()
            .filter(|invite| invite.generated_by == Some(issuer))
            .cloned()
            .collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }

    async fn redeem_invite(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        Ok(self.state.lock().await.redeem(code, user_id, now))
    }

    async fn create_user_with_invite(
        &self,
        user: &User,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        let mut state = self.state.lock().await;

        if state.emails.contains_key(&user.email) {
            return Err(AppError::conflict("Email already registered"));
        }

        let outcome = state.redeem(code, user.id, now);
        if outcome.is_redeemed() {
            state.insert_user(user)?;
        } else {
            debug!(user_id = %user.id, ?outcome, "Invite unavailable, registration discarded");
        }
        Ok(outcome)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
