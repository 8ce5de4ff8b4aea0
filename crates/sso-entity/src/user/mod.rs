//! User domain entities.

pub mod model;
pub mod permissions;
pub mod role;

pub use model::{User, UserPublic};
pub use permissions::Permissions;
pub use role::Role;
