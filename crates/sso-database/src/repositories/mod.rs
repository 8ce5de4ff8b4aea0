//! Concrete PostgreSQL repositories.

pub mod invite;
pub mod user;

pub use invite::InviteRepository;
pub use user::UserRepository;
