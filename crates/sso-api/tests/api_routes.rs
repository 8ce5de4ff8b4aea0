//! Route-level tests over an in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use sso_api::{AppState, build_app};
use sso_core::config::AppConfig;
use sso_core::traits::clock::{Clock, SystemClock};
use sso_database::{CredentialStore, MemoryCredentialStore};
use sso_entity::{InviteCode, Permissions, Role};

fn test_config() -> AppConfig {
    serde_json::from_value(json!({
        "database": { "url": "postgres://unused" },
        "auth": {
            "token_secret": "api-test-secret-0123456789abcdef!",
            "password_hash": { "memory_kib": 1024, "iterations": 1, "parallelism": 1 }
        }
    }))
    .expect("test config")
}

/// Clock pinned to one instant.
#[derive(Debug)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct TestApp {
    store: MemoryCredentialStore,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let store = MemoryCredentialStore::new();
        let state = AppState::new(test_config(), Arc::new(store.clone()), clock)
            .expect("app state");
        Self {
            store,
            app: build_app(state),
        }
    }

    async fn invite(&self, code: &str) {
        self.store
            .insert_invite(&InviteCode::new(code, None, Utc::now()))
            .await
            .expect("insert invite");
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("infallible");
        let status = response.status();
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, cookie, body)
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Option<String>, Value) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    async fn with_token(&self, method: Method, uri: &str, token: &str) -> (StatusCode, Value) {
        let (status, _, body) = self
            .send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await;
        (status, body)
    }

    async fn register(&self, email: &str, password: &str, invite: &str) -> (StatusCode, Value) {
        let (status, _, body) = self
            .post_json(
                "/api/auth/register",
                json!({ "email": email, "password": password, "inviteCode": invite }),
            )
            .await;
        (status, body)
    }

    async fn login_token(&self, email: &str, password: &str) -> String {
        let (status, _, body) = self
            .post_json(
                "/api/auth/login",
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }
}

#[tokio::test]
async fn test_register_login_and_fetch_profile() {
    let t = TestApp::new();
    t.invite("INV1").await;

    let (status, body) = t.register("alice@x", "pw123", "INV1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "alice@x");
    assert_eq!(body["data"]["role"], "User");
    assert!(body["data"].get("password_hash").is_none());

    let (status, cookie, body) = t
        .post_json(
            "/api/auth/login",
            json!({ "email": "alice@x", "password": "pw123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.expect("session cookie");
    assert!(cookie.starts_with("Token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(body["data"]["expiresAt"].is_string());

    let pair = cookie.split(';').next().expect("cookie pair").to_string();
    let (status, _, body) = t
        .send(
            Request::builder()
                .uri("/api/user")
                .header(COOKIE, pair)
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@x");
}

#[tokio::test]
async fn test_used_invite_rejected() {
    let t = TestApp::new();
    t.invite("INV1").await;
    assert_eq!(t.register("alice@x", "pw123", "INV1").await.0, StatusCode::CREATED);

    let (status, body) = t.register("bob@x", "pw456", "INV1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INVITE");

    let (status, _, _) = t
        .send(
            Request::builder()
                .uri("/api/auth/validate-invite/INV1")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let t = TestApp::new();
    t.invite("A").await;
    t.invite("B").await;
    assert_eq!(t.register("alice@x", "pw123", "A").await.0, StatusCode::CREATED);

    let (status, body) = t.register("alice@x", "other", "B").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let t = TestApp::new();
    t.invite("INV").await;
    t.register("alice@x", "pw123", "INV").await;

    let (s1, _, wrong_pw) = t
        .post_json("/api/auth/login", json!({ "email": "alice@x", "password": "nope" }))
        .await;
    let (s2, _, unknown) = t
        .post_json("/api/auth/login", json!({ "email": "ghost@x", "password": "pw123" }))
        .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
}

#[tokio::test]
async fn test_validate_requires_token() {
    let t = TestApp::new();
    let (status, _, body) = t
        .send(
            Request::builder()
                .uri("/api/auth/validate")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHENTICATED");

    let (status, _) = t.with_token(Method::GET, "/api/auth/validate", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_with_bearer_token() {
    let t = TestApp::new();
    t.invite("INV").await;
    t.register("alice@x", "pw123", "INV").await;
    let token = t.login_token("alice@x", "pw123").await;

    let (status, body) = t.with_token(Method::GET, "/api/auth/validate", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["user"]["email"], "alice@x");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let t = TestApp::new();
    let (status, cookie, body) = t
        .send(
            Request::builder()
                .uri("/api/auth/logout")
                .header(COOKIE, "Token=stale")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Logged out successfully");
    let cookie = cookie.expect("removal cookie");
    assert!(cookie.starts_with("Token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_plain_user_cannot_issue_invites() {
    let t = TestApp::new();
    t.invite("INV").await;
    t.register("alice@x", "pw123", "INV").await;
    let token = t.login_token("alice@x", "pw123").await;

    let (status, body) = t.with_token(Method::POST, "/api/invites", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_editor_issues_invite_that_admits_new_user() {
    let t = TestApp::new();
    t.invite("INV").await;
    let (_, body) = t.register("editor@x", "pw123", "INV").await;
    let id: sso_core::types::UserId =
        serde_json::from_value(body["data"]["id"].clone()).expect("user id");
    t.store
        .update_permissions(id, Permissions::from_roles(&[Role::User, Role::Editor]))
        .await
        .expect("grant editor");

    let token = t.login_token("editor@x", "pw123").await;
    let (status, body) = t.with_token(Method::POST, "/api/invites", &token).await;
    assert_eq!(status, StatusCode::CREATED);
    let code = body["data"]["id"].as_str().expect("code").to_string();

    let (status, body) = t.with_token(Method::GET, "/api/invites", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], code.as_str());

    assert_eq!(t.register("new@x", "pw", &code).await.0, StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_grants_and_revokes_roles() {
    let t = TestApp::new();
    t.invite("A").await;
    t.invite("B").await;
    let (_, admin) = t.register("admin@x", "pw123", "A").await;
    let (_, bob) = t.register("bob@x", "pw123", "B").await;

    let admin_id: sso_core::types::UserId =
        serde_json::from_value(admin["data"]["id"].clone()).expect("admin id");
    t.store
        .update_permissions(admin_id, Permissions::from_roles(&[Role::User, Role::Admin]))
        .await
        .expect("grant admin");
    let bob_id = bob["data"]["id"].as_str().expect("bob id").to_string();

    let token = t.login_token("admin@x", "pw123").await;
    let uri = format!("/api/admin/users/{bob_id}/roles/editor");

    let (status, body) = t.with_token(Method::PUT, &uri, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "Editor");

    let (status, body) = t.with_token(Method::DELETE, &uri, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "User");

    let bob_token = t.login_token("bob@x", "pw123").await;
    let (status, _) = t.with_token(Method::PUT, &uri, &bob_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health() {
    let t = TestApp::new();
    let (status, _, body) = t
        .send(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_stale_cookie_does_not_mask_bearer() {
    let t = TestApp::new();
    t.invite("INV").await;
    t.register("alice@x", "pw123", "INV").await;
    let token = t.login_token("alice@x", "pw123").await;

    let (status, _, body) = t
        .send(
            Request::builder()
                .uri("/api/auth/validate")
                .header(COOKIE, "Token=stale")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "alice@x");

    let (status, _, _) = t
        .send(
            Request::builder()
                .uri("/api/auth/validate")
                .header(COOKIE, "Token=stale")
                .header(AUTHORIZATION, "Bearer also-stale")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_max_age_follows_token_ttl_not_wall_clock() {
    let pinned = Utc::now() - chrono::Duration::days(30);
    let t = TestApp::with_clock(Arc::new(FixedClock(pinned)));
    t.invite("INV").await;
    t.register("alice@x", "pw123", "INV").await;

    let (status, cookie, body) = t
        .post_json(
            "/api/auth/login",
            json!({ "email": "alice@x", "password": "pw123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.expect("session cookie");
    assert!(cookie.contains("Max-Age=259200"), "cookie was {cookie}");

    let expires_at: DateTime<Utc> =
        serde_json::from_value(body["data"]["expiresAt"].clone()).expect("expiry");
    assert_eq!(expires_at.timestamp(), (pinned + chrono::Duration::hours(72)).timestamp());
}
