//! # sso-core
//!
//! Core crate for Pragma SSO. Contains the unified error system,
//! configuration schemas and loader, typed identifiers and the clock
//! abstraction shared by every other crate.
//!
//! This crate has **no** internal dependencies on other SSO crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
