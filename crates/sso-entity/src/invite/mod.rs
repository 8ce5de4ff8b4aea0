//! Invite code entities.

pub mod model;

pub use model::InviteCode;
