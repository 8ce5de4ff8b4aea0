//! Role checks used by route guards.

use sso_core::error::AppError;
use sso_entity::{Permissions, Role};

/// Checks permission masks against required roles.
///
/// Roles are independent bits, not a hierarchy: holding `Admin` does not
/// imply holding `Editor`. Guards that accept several roles say so
/// explicitly with [`require_any`](Self::require_any).
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Whether the mask holds `role`.
    pub fn has_role(&self, permissions: Permissions, role: Role) -> bool {
        permissions.has_role(role)
    }

    /// `Forbidden` unless the mask holds `role`.
    pub fn require_role(&self, permissions: Permissions, role: Role) -> Result<(), AppError> {
        if permissions.has_role(role) {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient permissions"))
        }
    }

    /// `Forbidden` unless the mask holds at least one of `roles`.
    pub fn require_any(&self, permissions: Permissions, roles: &[Role]) -> Result<(), AppError> {
        if roles.iter().any(|role| permissions.has_role(*role)) {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient permissions"))
        }
    }

    /// `Forbidden` unless the mask holds `Admin`.
    pub fn require_admin(&self, permissions: Permissions) -> Result<(), AppError> {
        self.require_role(permissions, Role::Admin)
    }

    /// `Forbidden` unless the mask holds `Editor`.
    pub fn require_editor(&self, permissions: Permissions) -> Result<(), AppError> {
        self.require_role(permissions, Role::Editor)
    }
}
