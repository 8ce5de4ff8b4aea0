//! Invite handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::ApiError;
use sso_entity::InviteCode;

use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/invites
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(StatusCode, Json<ApiResponse<InviteCode>>), ApiError> {
    let invite = state.invite_service.create(&auth).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(invite))))
}

/// GET /api/invites
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<InviteCode>>>, ApiError> {
    let invites = state.invite_service.list_mine(&auth).await?;
    Ok(Json(ApiResponse::ok(invites)))
}

/// GET /api/invites/{code}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<InviteCode>>, ApiError> {
    let invite = state.invite_service.lookup(&auth, &code).await?;
    Ok(Json(ApiResponse::ok(invite)))
}
