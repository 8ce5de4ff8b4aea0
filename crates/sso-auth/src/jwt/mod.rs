//! Session tokens: HS256-signed JWTs.

pub mod claims;
pub mod service;

pub use claims::Claims;
pub use service::{IssuedToken, TokenService, VerifyError};
