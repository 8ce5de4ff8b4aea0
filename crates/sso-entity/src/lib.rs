//! # sso-entity
//!
//! Domain entity models for Pragma SSO. Persisted entities derive
//! `sqlx::FromRow`; value objects such as [`user::Permissions`] are plain
//! `Copy` types with no I/O.

pub mod invite;
pub mod user;

pub use invite::InviteCode;
pub use user::{Permissions, Role, User, UserPublic};
