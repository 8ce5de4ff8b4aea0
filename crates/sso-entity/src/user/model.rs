//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sso_core::types::UserId;

use super::permissions::Permissions;
use super::role::Role;

/// A registered user.
///
/// `email` is unique and compared exactly as stored. `id` never changes
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Argon2 password hash. Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role bitmask.
    pub permissions: Permissions,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user with a fresh id.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        permissions: Permissions,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            password_hash: password_hash.into(),
            permissions,
            created_at,
        }
    }

    /// Whether the user holds the role.
    pub fn has_role(&self, role: Role) -> bool {
        self.permissions.has_role(role)
    }

    /// Grant a role in memory.
    pub fn grant(&mut self, role: Role) {
        self.permissions.grant(role);
    }

    /// Revoke a role in memory.
    pub fn revoke(&mut self, role: Role) {
        self.permissions.revoke(role);
    }

    /// Label of the highest role held.
    pub fn highest_privilege(&self) -> &'static str {
        self.permissions.highest_privilege()
    }

    /// The public view of this user.
    pub fn to_public(&self) -> UserPublic {
        UserPublic::from(self)
    }
}

/// Identity fields safe to hand to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    /// Unique user identifier.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Role bitmask.
    pub permissions: Permissions,
    /// Label of the highest role held.
    pub role: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            permissions: user.permissions,
            role: user.highest_privilege().to_string(),
        }
    }
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_never_serialized() {
        let user = User::new("alice@x", "$argon2id$secret", Permissions::NONE, Utc::now());
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "alice@x");
    }

    #[test]
    fn test_public_view() {
        let mut user = User::new("bob@x", "h", Permissions::from_roles(&[Role::User]), Utc::now());
        user.grant(Role::Admin);
        let public = user.to_public();
        assert_eq!(public.id, user.id);
        assert_eq!(public.role, "Admin");
        assert_eq!(public.permissions.bits(), 5);
    }
}
