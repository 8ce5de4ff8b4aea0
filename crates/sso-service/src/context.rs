//! Request context carrying the acting identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sso_core::types::UserId;
use sso_entity::{Permissions, Role, UserPublic};

/// Who is performing an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user, or `None` for the local operator (CLI).
    pub user_id: Option<UserId>,
    /// Permissions of the actor at the time of the request.
    pub permissions: Permissions,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an authenticated user.
    pub fn for_user(user: &UserPublic) -> Self {
        Self {
            user_id: Some(user.id),
            permissions: user.permissions,
            request_time: Utc::now(),
        }
    }

    /// Context for the local operator, who holds every role and acts as
    /// "the system". Invites it generates are system-issued.
    pub fn operator() -> Self {
        Self {
            user_id: None,
            permissions: Permissions::from_roles(&Role::BY_PRIVILEGE),
            request_time: Utc::now(),
        }
    }

    /// Whether the actor is the given user.
    pub fn is_user(&self, id: UserId) -> bool {
        self.user_id == Some(id)
    }
}
