//! Administrative user operations: role changes and deletion.

use std::sync::Arc;

use tracing::{info, warn};

use sso_auth::{RbacEnforcer, StoreDeadline};
use sso_core::error::AppError;
use sso_core::types::UserId;
use sso_database::CredentialStore;
use sso_entity::{Role, UserPublic};

use crate::context::RequestContext;

/// Admin-only user management.
///
/// Role changes read the current mask, apply the bit change in memory and
/// write the whole mask back. Two admins editing the same user at once can
/// therefore lose one of the edits; the last write wins.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    store: Arc<dyn CredentialStore>,
    rbac: RbacEnforcer,
    deadline: StoreDeadline,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(store: Arc<dyn CredentialStore>, rbac: RbacEnforcer, deadline: StoreDeadline) -> Self {
        Self {
            store,
            rbac,
            deadline,
        }
    }

    /// Looks a user up by exact email.
    pub async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<UserPublic, AppError> {
        self.rbac.require_admin(ctx.permissions)?;
        self.deadline
            .run("find_user_by_email", self.store.find_user_by_email(email))
            .await?
            .map(UserPublic::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Looks a user up by id.
    pub async fn get_user(&self, ctx: &RequestContext, id: UserId) -> Result<UserPublic, AppError> {
        self.rbac.require_admin(ctx.permissions)?;
        self.deadline
            .run("find_user_by_id", self.store.find_user_by_id(id))
            .await?
            .map(UserPublic::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Grants `role` to the target user.
    pub async fn grant_role(
        &self,
        ctx: &RequestContext,
        target: UserId,
        role: Role,
    ) -> Result<UserPublic, AppError> {
        self.rbac.require_admin(ctx.permissions)?;
        let updated = self.change_role(target, role, true).await?;
        info!(actor = ?ctx.user_id, target = %target, %role, "Role granted");
        Ok(updated)
    }

    /// Revokes `role` from the target user.
    ///
    /// An admin may not revoke their own admin role, so the last admin
    /// cannot lock everyone out by accident.
    pub async fn revoke_role(
        &self,
        ctx: &RequestContext,
        target: UserId,
        role: Role,
    ) -> Result<UserPublic, AppError> {
        self.rbac.require_admin(ctx.permissions)?;
        if role == Role::Admin && ctx.is_user(target) {
            return Err(AppError::validation("Cannot revoke your own admin role"));
        }
        let updated = self.change_role(target, role, false).await?;
        info!(actor = ?ctx.user_id, target = %target, %role, "Role revoked");
        Ok(updated)
    }

    /// Deletes the target user.
    ///
    /// Outstanding tokens for the user stop validating immediately. Invite
    /// codes the user redeemed keep their `used_by` value.
    pub async fn delete_user(&self, ctx: &RequestContext, target: UserId) -> Result<(), AppError> {
        self.rbac.require_admin(ctx.permissions)?;
        if ctx.is_user(target) {
            return Err(AppError::validation("Cannot delete your own account"));
        }
        let removed = self
            .deadline
            .run("delete_user", self.store.delete_user(target))
            .await?;
        if !removed {
            return Err(AppError::not_found("User not found"));
        }
        warn!(actor = ?ctx.user_id, target = %target, "User deleted");
        Ok(())
    }

    async fn change_role(
        &self,
        target: UserId,
        role: Role,
        grant: bool,
    ) -> Result<UserPublic, AppError> {
        let user = self
            .deadline
            .run("find_user_by_id", self.store.find_user_by_id(target))
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let mut permissions = user.permissions;
        if grant {
            permissions.grant(role);
        } else {
            permissions.revoke(role);
        }

        self.deadline
            .run(
                "update_permissions",
                self.store.update_permissions(target, permissions),
            )
            .await?
            .map(UserPublic::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
