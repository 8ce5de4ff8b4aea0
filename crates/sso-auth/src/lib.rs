//! # sso-auth
//!
//! The credential and session lifecycle of Pragma SSO.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and credential input policy
//! - `jwt`: HS256 session token issuance and verification
//! - `invite`: single-use invite generation, lookup and redemption
//! - `rbac`: role checks for route guards
//! - `session`: registration, login and session validation flows
//! - `deadline`: upper bound on individual store calls

pub mod deadline;
pub mod invite;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use deadline::StoreDeadline;
pub use invite::InviteLedger;
pub use jwt::{Claims, IssuedToken, TokenService, VerifyError};
pub use password::{CredentialPolicy, PasswordHasher};
pub use rbac::RbacEnforcer;
pub use session::{LoginResult, SessionManager};
