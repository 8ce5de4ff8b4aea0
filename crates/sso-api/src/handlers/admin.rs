//! Admin user-management handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use sso_core::types::UserId;
use sso_entity::{Role, UserPublic};

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<UserPublic>>, ApiError> {
    let user = state.admin_service.get_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/admin/users/{id}/roles/{role}
pub async fn grant_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, role)): Path<(UserId, Role)>,
) -> Result<Json<ApiResponse<UserPublic>>, ApiError> {
    let user = state.admin_service.grant_role(&auth, id, role).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/admin/users/{id}/roles/{role}
pub async fn revoke_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, role)): Path<(UserId, Role)>,
) -> Result<Json<ApiResponse<UserPublic>>, ApiError> {
    let user = state.admin_service.revoke_role(&auth, id, role).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.admin_service.delete_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("User deleted"))))
}
