//! User roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse-grained capability tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Ordinary user: may only touch their own notes.
    #[default]
    Regular,
    /// May view and edit all notes and list users.
    Admin,
    /// Everything an admin can do, plus changing roles.
    Owner,
}

/// Returned when a string does not name a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid role: {0}")]
pub struct InvalidRole(pub String);

impl Role {
    /// All roles, lowest tier first.
    pub const ALL: [Role; 3] = [Role::Regular, Role::Admin, Role::Owner];

    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Admin => "ADMIN",
            Self::Owner => "OWNER",
        }
    }

    /// Returns true for ADMIN and OWNER.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::Owner)
    }

    /// Returns true for OWNER.
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| InvalidRole(s.to_string()))
    }
}

/// A persisted role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRole {
    /// Creates a new assignment stamped with `now`.
    pub fn new(email: impl Into<String>, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The single identity permanently pinned to [`Role::Owner`].
///
/// Emails are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdentity {
    email: String,
}

impl OwnerIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: normalize_email(&email.into()),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns true if `email` is the owner.
    pub fn matches(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// Canonical form used as the role store key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_exact_names_only() {
        assert_eq!("REGULAR".parse::<Role>().unwrap(), Role::Regular);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("OWNER".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!(
            "admin".parse::<Role>().unwrap_err(),
            InvalidRole("admin".to_string())
        );
        assert!("SUPERUSER".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn display_matches_wire_name() {
        for role in Role::ALL {
            assert_eq!(role.to_string(), role.as_str());
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn tiers() {
        assert!(!Role::Regular.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(Role::Owner.is_admin());
        assert!(!Role::Admin.is_owner());
        assert!(Role::Owner.is_owner());
        assert_eq!(Role::default(), Role::Regular);
    }

    #[test]
    fn owner_identity_ignores_case_and_whitespace() {
        let owner = OwnerIdentity::new("Boss@Example.com");
        assert_eq!(owner.email(), "boss@example.com");
        assert!(owner.matches("boss@example.com"));
        assert!(owner.matches("BOSS@EXAMPLE.COM "));
        assert!(!owner.matches("other@example.com"));
    }
}
