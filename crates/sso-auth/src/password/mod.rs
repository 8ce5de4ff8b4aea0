//! Password hashing and credential input policy.

pub mod hasher;
pub mod policy;

pub use hasher::PasswordHasher;
pub use policy::CredentialPolicy;
