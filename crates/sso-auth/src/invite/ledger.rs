//! Invite generation, lookup and redemption.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use sso_core::error::AppError;
use sso_core::result::AppResult;
use sso_core::traits::Clock;
use sso_core::types::UserId;
use sso_database::{CredentialStore, RedeemOutcome};
use sso_entity::{InviteCode, User};

use crate::deadline::StoreDeadline;

/// Issues and redeems invite codes.
///
/// Redemption is delegated to the store's compare-and-set so that a code
/// can be bound to at most one user, however many requests race for it.
#[derive(Clone)]
pub struct InviteLedger {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    deadline: StoreDeadline,
}

impl std::fmt::Debug for InviteLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteLedger")
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl InviteLedger {
    /// Creates a ledger over the given store.
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>, deadline: StoreDeadline) -> Self {
        Self {
            store,
            clock,
            deadline,
        }
    }

    /// Generates and persists a fresh code.
    ///
    /// `issuer` is `None` for system-issued codes, e.g. the bootstrap
    /// invite created from the CLI.
    pub async fn generate(&self, issuer: Option<UserId>) -> AppResult<InviteCode> {
        let invite = InviteCode::new(new_code(), issuer, self.clock.now());
        self.deadline
            .run("insert_invite", self.store.insert_invite(&invite))
            .await?;

        info!(
            issuer = ?issuer.map(|id| id.to_string()),
            "Invite code generated"
        );
        Ok(invite)
    }

    /// Fetches a code regardless of whether it has been used.
    pub async fn lookup(&self, code: &str) -> AppResult<InviteCode> {
        self.deadline
            .run("find_invite", self.store.find_invite(code))
            .await?
            .ok_or_else(|| AppError::not_found("Invite code not found"))
    }

    /// Confirms a code exists and is unused.
    ///
    /// Advisory only: the answer can be stale by the time the code is
    /// redeemed.
    pub async fn check(&self, code: &str) -> AppResult<InviteCode> {
        if code.trim().is_empty() {
            return Err(AppError::invalid_invite("Invite code is required"));
        }
        let invite = self
            .deadline
            .run("find_invite", self.store.find_invite(code))
            .await?
            .ok_or_else(|| AppError::invalid_invite("Invalid invite code"))?;
        if invite.is_used() {
            return Err(AppError::invalid_invite("Invite code already used"));
        }
        Ok(invite)
    }

    /// Binds an existing user to the code, if it is still unused.
    pub async fn redeem(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        let outcome = self
            .deadline
            .run("redeem_invite", self.store.redeem_invite(code, user_id, now))
            .await?;
        if outcome.is_redeemed() {
            info!(user_id = %user_id, "Invite code redeemed");
        }
        Ok(outcome)
    }

    /// Creates `user` and redeems `code` for it in one atomic unit.
    ///
    /// Losing a race for the code surfaces as `InvalidInvite` with nothing
    /// written.
    pub async fn redeem_for_new_user(
        &self,
        user: &User,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let outcome = self
            .deadline
            .run(
                "create_user_with_invite",
                self.store.create_user_with_invite(user, code, now),
            )
            .await?;

        match outcome {
            RedeemOutcome::Redeemed => {
                info!(user_id = %user.id, "Invite code redeemed");
                Ok(())
            }
            RedeemOutcome::AlreadyUsed => Err(AppError::invalid_invite("Invite code already used")),
            RedeemOutcome::NotFound => Err(AppError::invalid_invite("Invalid invite code")),
        }
    }

    /// Codes generated by `issuer`, newest first.
    pub async fn issued_by(&self, issuer: UserId) -> AppResult<Vec<InviteCode>> {
        self.deadline
            .run("list_invites_by_issuer", self.store.list_invites_by_issuer(issuer))
            .await
    }
}

/// 32 lowercase hex characters from a random v4 UUID.
fn new_code() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use sso_core::error::ErrorKind;
    use sso_core::traits::SystemClock;
    use sso_database::MemoryCredentialStore;
    use sso_entity::Permissions;

    fn ledger() -> InviteLedger {
        InviteLedger::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(SystemClock),
            StoreDeadline::new(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn test_generate_fresh_code() {
        let ledger = ledger();
        let issuer = UserId::new();
        let invite = ledger.generate(Some(issuer)).await.expect("generate");
        assert_eq!(invite.id.len(), 32);
        assert!(invite.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(invite.generated_by, Some(issuer));
        assert!(!invite.is_used());

        let other = ledger.generate(None).await.expect("generate");
        assert_ne!(invite.id, other.id);
    }

    #[tokio::test]
    async fn test_lookup_returns_used_codes_too() {
        let ledger = ledger();
        let invite = ledger.generate(None).await.expect("generate");
        let user = UserId::new();
        ledger
            .redeem(&invite.id, user, Utc::now())
            .await
            .expect("redeem");
        let found = ledger.lookup(&invite.id).await.expect("lookup");
        assert_eq!(found.used_by, Some(user));

        let err = ledger.lookup("missing").await.expect_err("unknown code");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_check() {
        let ledger = ledger();
        let invite = ledger.generate(None).await.expect("generate");
        assert!(ledger.check(&invite.id).await.is_ok());

        ledger
            .redeem(&invite.id, UserId::new(), Utc::now())
            .await
            .expect("redeem");
        for code in [invite.id.as_str(), "missing", "  "] {
            let err = ledger.check(code).await.expect_err("unusable");
            assert_eq!(err.kind, ErrorKind::InvalidInvite);
        }
    }

    #[tokio::test]
    async fn test_redeem_refuses_second_user() {
        let ledger = ledger();
        let invite = ledger.generate(None).await.expect("generate");
        let now = Utc::now();
        assert_eq!(
            ledger.redeem(&invite.id, UserId::new(), now).await.expect("redeem"),
            RedeemOutcome::Redeemed
        );
        assert_eq!(
            ledger.redeem(&invite.id, UserId::new(), now).await.expect("redeem"),
            RedeemOutcome::AlreadyUsed
        );
        assert_eq!(
            ledger.redeem("nope", UserId::new(), now).await.expect("redeem"),
            RedeemOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_redeem_for_new_user_maps_outcomes() {
        let ledger = ledger();
        let invite = ledger.generate(None).await.expect("generate");
        let now = Utc::now();

        let alice = User::new("alice@x", "h", Permissions::NONE, now);
        ledger
            .redeem_for_new_user(&alice, &invite.id, now)
            .await
            .expect("first redemption");

        let bob = User::new("bob@x", "h", Permissions::NONE, now);
        let err = ledger
            .redeem_for_new_user(&bob, &invite.id, now)
            .await
            .expect_err("second redemption");
        assert_eq!(err.kind, ErrorKind::InvalidInvite);

        let err = ledger
            .redeem_for_new_user(&bob, "missing", now)
            .await
            .expect_err("unknown code");
        assert_eq!(err.kind, ErrorKind::InvalidInvite);
    }

    #[tokio::test]
    async fn test_issued_by_lists_own_codes() {
        let ledger = ledger();
        let issuer = UserId::new();
        let a = ledger.generate(Some(issuer)).await.expect("generate");
        let b = ledger.generate(Some(issuer)).await.expect("generate");
        ledger.generate(None).await.expect("generate");

        let mut ids: Vec<String> = ledger
            .issued_by(issuer)
            .await
            .expect("list")
            .into_iter()
            .map(|i| i.id)
            .collect();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
