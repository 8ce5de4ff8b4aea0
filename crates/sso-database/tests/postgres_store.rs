//! Store tests against a live PostgreSQL.
//!
//! Ignored by default. Run with
//! `DATABASE_URL=postgres://... cargo test -p sso-database -- --ignored`.

use chrono::Utc;
use sqlx::PgPool;

use sso_core::error::ErrorKind;
use sso_core::types::UserId;
use sso_database::migration::run_migrations;
use sso_database::{CredentialStore, PgCredentialStore, RedeemOutcome};
use sso_entity::{InviteCode, Permissions, User};

async fn store() -> PgCredentialStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect");
    run_migrations(&pool).await.expect("migrate");
    PgCredentialStore::new(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

fn user(email: &str) -> User {
    User::new(email, "$argon2id$placeholder", Permissions::NONE, Utc::now())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_maps_to_conflict() {
    let store = store().await;
    let email = format!("{}@example.test", unique("dup"));
    store.insert_user(&user(&email)).await.expect("first insert");
    let err = store.insert_user(&user(&email)).await.expect_err("second insert");
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_used_invite_rolls_back_user_insert() {
    let store = store().await;
    let code = unique("inv");
    store
        .insert_invite(&InviteCode::new(&code, None, Utc::now()))
        .await
        .expect("insert invite");

    let first = user(&format!("{}@example.test", unique("a")));
    assert_eq!(
        store.create_user_with_invite(&first, &code, Utc::now()).await.expect("first"),
        RedeemOutcome::Redeemed
    );

    let second = user(&format!("{}@example.test", unique("b")));
    assert_eq!(
        store.create_user_with_invite(&second, &code, Utc::now()).await.expect("second"),
        RedeemOutcome::AlreadyUsed
    );
    assert!(store.find_user_by_id(second.id).await.expect("lookup").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_redemption_has_one_winner() {
    let store = store().await;
    let code = unique("race");
    store
        .insert_invite(&InviteCode::new(&code, None, Utc::now()))
        .await
        .expect("insert invite");

    let attempts = (0..16).map(|i| {
        let store = store.clone();
        let code = code.clone();
        tokio::spawn(async move {
            let candidate = user(&format!("{}-{i}@example.test", unique("racer")));
            let outcome = store
                .create_user_with_invite(&candidate, &code, Utc::now())
                .await
                .expect("store call");
            (candidate.id, outcome)
        })
    });

    let results: Vec<(UserId, RedeemOutcome)> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.expect("task"))
        .collect();

    let winners: Vec<UserId> = results
        .iter()
        .filter(|(_, outcome)| outcome.is_redeemed())
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(winners.len(), 1);
    assert!(results
        .iter()
        .filter(|(_, outcome)| !outcome.is_redeemed())
        .all(|(_, outcome)| *outcome == RedeemOutcome::AlreadyUsed));

    let invite = store.find_invite(&code).await.expect("lookup").expect("exists");
    assert_eq!(invite.used_by, Some(winners[0]));
}
