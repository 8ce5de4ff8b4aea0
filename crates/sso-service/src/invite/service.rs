//! Permission-gated invite operations.

use std::sync::Arc;

use sso_auth::{InviteLedger, RbacEnforcer};
use sso_core::error::AppError;
use sso_entity::{InviteCode, Role};

use crate::context::RequestContext;

/// Roles allowed to issue invites.
const ISSUER_ROLES: [Role; 2] = [Role::Admin, Role::Editor];

/// Wraps the invite ledger with role checks.
#[derive(Debug, Clone)]
pub struct InviteService {
    ledger: Arc<InviteLedger>,
    rbac: RbacEnforcer,
}

impl InviteService {
    /// Creates a new invite service.
    pub fn new(ledger: Arc<InviteLedger>, rbac: RbacEnforcer) -> Self {
        Self { ledger, rbac }
    }

    /// Issues a new code on behalf of the actor. Requires Admin or Editor.
    pub async fn create(&self, ctx: &RequestContext) -> Result<InviteCode, AppError> {
        self.rbac.require_any(ctx.permissions, &ISSUER_ROLES)?;
        self.ledger.generate(ctx.user_id).await
    }

    /// Codes the actor generated.
    pub async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<InviteCode>, AppError> {
        let id = ctx
            .user_id
            .ok_or_else(|| AppError::validation("The operator has no issued invites"))?;
        self.ledger.issued_by(id).await
    }

    /// Full record of any code, used or not. Requires Admin.
    pub async fn lookup(&self, ctx: &RequestContext, code: &str) -> Result<InviteCode, AppError> {
        self.rbac.require_admin(ctx.permissions)?;
        self.ledger.lookup(code).await
    }

    /// Whether the code can still be redeemed. Open to anyone.
    pub async fn check(&self, code: &str) -> Result<(), AppError> {
        self.ledger.check(code).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use sso_auth::StoreDeadline;
    use sso_core::error::ErrorKind;
    use sso_core::traits::SystemClock;
    use sso_core::types::UserId;
    use sso_database::MemoryCredentialStore;
    use sso_entity::Permissions;

    fn service() -> InviteService {
        let ledger = InviteLedger::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(SystemClock),
            StoreDeadline::new(Duration::from_secs(5)),
        );
        InviteService::new(Arc::new(ledger), RbacEnforcer::new())
    }

    fn ctx(roles: &[Role]) -> RequestContext {
        RequestContext {
            user_id: Some(UserId::new()),
            permissions: Permissions::from_roles(roles),
            request_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_editor_issues_and_lists() {
        let service = service();
        let editor = ctx(&[Role::User, Role::Editor]);
        let invite = service.create(&editor).await.expect("create");
        assert_eq!(invite.generated_by, editor.user_id);

        let mine = service.list_mine(&editor).await.expect("list");
        assert_eq!(mine, vec![invite.clone()]);
        assert!(service.check(&invite.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_plain_user_cannot_issue() {
        let err = service()
            .create(&ctx(&[Role::User]))
            .await
            .expect_err("plain user");
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_operator_issues_system_codes() {
        let service = service();
        let invite = service.create(&RequestContext::operator()).await.expect("create");
        assert_eq!(invite.generated_by, None);
        let found = service
            .lookup(&RequestContext::operator(), &invite.id)
            .await
            .expect("lookup");
        assert_eq!(found, invite);
    }

    #[tokio::test]
    async fn test_lookup_requires_admin() {
        let service = service();
        let editor = ctx(&[Role::Editor]);
        let invite = service.create(&editor).await.expect("create");
        let err = service
            .lookup(&editor, &invite.id)
            .await
            .expect_err("editor lookup");
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
