//! Role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single role. Each role owns exactly one bit of a
/// [`Permissions`](super::Permissions) mask.
///
/// New roles are added by claiming the next unused bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary registered user.
    User,
    /// May issue invites.
    Editor,
    /// Full administrator.
    Admin,
}

impl Role {
    /// All roles, highest privilege first.
    pub const BY_PRIVILEGE: [Role; 3] = [Role::Admin, Role::Editor, Role::User];

    /// The bit this role occupies.
    pub const fn bit(self) -> i32 {
        match self {
            Self::User => 1,
            Self::Editor => 1 << 1,
            Self::Admin => 1 << 2,
        }
    }

    /// Capitalised label, as reported by
    /// [`Permissions::highest_privilege`](super::Permissions::highest_privilege).
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Editor => "Editor",
            Self::Admin => "Admin",
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = sso_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "editor" => Ok(Self::Editor),
            "admin" => Ok(Self::Admin),
            _ => Err(sso_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: user, editor, admin"
            ))),
        }
    }
}
