//! `AuthUser` extractor: resolves the session token to a live user.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use sso_core::error::{AppError, ErrorKind};
use sso_entity::UserPublic;
use sso_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user behind the request.
///
/// The session cookie is tried first, then an `Authorization: Bearer`
/// header. The first token that validates wins.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Public view of the user.
    pub user: UserPublic,
    /// Context handed to services.
    pub context: RequestContext,
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let candidates = session_tokens(parts, &state.config.server.cookie_name);
        let mut last_err = AppError::unauthenticated("Missing session token");

        for token in candidates {
            match state.session_manager.validate_session(&token).await {
                Ok(user) => {
                    let context = RequestContext::for_user(&user);
                    return Ok(Self { user, context });
                }
                Err(e) if e.kind == ErrorKind::Unauthenticated => last_err = e,
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_err.into())
    }
}

/// Candidate tokens in the order they are tried: the named cookie, then
/// the bearer header. A stale cookie does not mask a valid header.
fn session_tokens(parts: &Parts, cookie_name: &str) -> Vec<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());

    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    let mut tokens: Vec<String> = cookie.into_iter().collect();
    if let Some(bearer) = bearer {
        if !tokens.contains(&bearer) {
            tokens.push(bearer);
        }
    }
    tokens
}
