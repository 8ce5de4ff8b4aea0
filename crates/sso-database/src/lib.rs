//! # sso-database
//!
//! Persistence for Pragma SSO. The [`CredentialStore`] trait names every
//! store capability the service relies on, including the atomic
//! "create user and redeem invite" unit. Two implementations ship:
//!
//! - [`PgCredentialStore`]: PostgreSQL via sqlx. Uniqueness comes from
//!   constraints and redemption is a conditional `UPDATE` inside the same
//!   transaction that inserts the user.
//! - [`MemoryCredentialStore`]: a mutex-guarded map for tests and
//!   single-node demos.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
pub use store::{CredentialStore, RedeemOutcome};
