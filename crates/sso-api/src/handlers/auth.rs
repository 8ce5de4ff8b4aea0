//! Auth handlers: register, login, logout, validate, validate-invite.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use sso_core::config::server::ServerConfig;
use crate::error::ApiError;
use sso_entity::UserPublic;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse, ValidateResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserPublic>>), ApiError> {
    let user = state
        .session_manager
        .register(&req.email, &req.password, &req.invite_code)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let result = state.session_manager.login(&req.email, &req.password).await?;

    let cookie = session_cookie(
        &state.config.server,
        result.token.clone(),
        state.session_manager.tokens().ttl(),
    );

    Ok((
        jar.add(cookie),
        Json(ApiResponse::ok(LoginResponse {
            token: result.token,
            expires_at: result.expires_at,
            user: result.user,
        })),
    ))
}

/// GET /api/auth/logout
///
/// Only clears the cookie. Tokens are stateless, so a copy held elsewhere
/// stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    let removal = Cookie::build((state.config.server.cookie_name.clone(), ""))
        .path("/")
        .build();
    (
        jar.remove(removal),
        Json(ApiResponse::ok(MessageResponse::new("Logged out successfully"))),
    )
}

/// GET /api/auth/validate
pub async fn validate(auth: AuthUser) -> Json<ApiResponse<ValidateResponse>> {
    Json(ApiResponse::ok(ValidateResponse {
        valid: true,
        user: auth.user,
    }))
}

/// GET /api/auth/validate-invite/{invite}
pub async fn validate_invite(
    State(state): State<AppState>,
    Path(invite): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.invite_service.check(&invite).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("valid"))))
}

/// HTTP-only session cookie that lives as long as the token.
fn session_cookie(config: &ServerConfig, token: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}
