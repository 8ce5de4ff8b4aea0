//! User self-service operations.

use std::sync::Arc;

use sso_auth::StoreDeadline;
use sso_core::error::AppError;
use sso_database::CredentialStore;
use sso_entity::UserPublic;

use crate::context::RequestContext;

/// Handles operations a user performs on their own account.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
    deadline: StoreDeadline,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(store: Arc<dyn CredentialStore>, deadline: StoreDeadline) -> Self {
        Self { store, deadline }
    }

    /// Gets the acting user's public profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<UserPublic, AppError> {
        let id = ctx
            .user_id
            .ok_or_else(|| AppError::unauthenticated("No user in request context"))?;
        self.deadline
            .run("find_user_by_id", self.store.find_user_by_id(id))
            .await?
            .map(UserPublic::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
