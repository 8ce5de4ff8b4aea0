//! Route definitions for the Pragma SSO HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to every handler via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the API router without outer middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(invite_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Register, login, logout, session and invite checks
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", get(handlers::auth::logout))
        .route("/auth/validate", get(handlers::auth::validate))
        .route(
            "/auth/validate-invite/{invite}",
            get(handlers::auth::validate_invite),
        )
}

/// Current user
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(handlers::user::me))
        .route("/user/", get(handlers::user::me))
}

/// Invite issuance and lookup
fn invite_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/invites",
            post(handlers::invite::create).get(handlers::invite::list_mine),
        )
        .route("/invites/{code}", get(handlers::invite::get))
}

/// Role management (admin only)
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/users/{id}",
            get(handlers::admin::get_user).delete(handlers::admin::delete_user),
        )
        .route(
            "/admin/users/{id}/roles/{role}",
            put(handlers::admin::grant_role).delete(handlers::admin::revoke_role),
        )
}

/// Liveness and store health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
