//! Permission bitmask.
//!
//! A user's permissions are a set of [`Role`] bits packed into one integer
//! column. All operations are pure; persisting a changed mask is the
//! caller's job.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::role::Role;

/// Label reported when no role bit is set.
pub const NO_PRIVILEGE: &str = "None";

/// A set of roles stored as a bitmask.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Permissions(i32);

impl Permissions {
    /// The empty set.
    pub const NONE: Permissions = Permissions(0);

    /// Build a mask from raw bits. Unknown bits are kept so that masks
    /// written by newer deployments survive a round trip.
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Build a mask holding exactly the given roles.
    pub fn from_roles(roles: &[Role]) -> Self {
        roles.iter().fold(Self::NONE, |acc, role| acc.with(*role))
    }

    /// The raw bits.
    pub const fn bits(self) -> i32 {
        self.0
    }

    /// Whether the role's bit is set.
    pub const fn has_role(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Set the role's bit.
    pub fn grant(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    /// Clear the role's bit.
    pub fn revoke(&mut self, role: Role) {
        self.0 &= !role.bit();
    }

    /// Copy of `self` with the role's bit set.
    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    /// The roles present, highest privilege first.
    pub fn roles(self) -> Vec<Role> {
        Role::BY_PRIVILEGE
            .into_iter()
            .filter(|role| self.has_role(*role))
            .collect()
    }

    /// Highest-privilege role held, if any.
    pub fn highest_role(self) -> Option<Role> {
        Role::BY_PRIVILEGE
            .into_iter()
            .find(|role| self.has_role(*role))
    }

    /// Label of the highest-privilege role: `"Admin"`, `"Editor"`, `"User"`
    /// or `"None"`.
    pub fn highest_privilege(self) -> &'static str {
        self.highest_role().map_or(NO_PRIVILEGE, Role::label)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles = self.roles();
        if roles.is_empty() {
            return write!(f, "{NO_PRIVILEGE}");
        }
        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}
