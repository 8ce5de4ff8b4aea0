//! # sso-service
//!
//! Use-case services for Pragma SSO. Each service receives a
//! [`RequestContext`] describing who is acting and enforces the role
//! requirements of the operation before touching the store.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod context;
pub mod invite;
pub mod user;

pub use context::RequestContext;
pub use invite::InviteService;
pub use user::{AdminUserService, UserService};
