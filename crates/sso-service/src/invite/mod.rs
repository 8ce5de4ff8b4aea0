//! Invite issuance.

pub mod service;

pub use service::InviteService;
