//! Registration, login and session validation.

pub mod manager;

pub use manager::{LoginResult, SessionManager};
