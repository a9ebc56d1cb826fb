// SPDX-License-Identifier: MIT

//! User profile model and role resolution.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore (`users/{uid}`).
///
/// Field names follow the store schema of the original frontend so
/// documents remain readable by both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Firebase-style uid (also used as document ID)
    #[serde(alias = "_firestore_id", default)]
    pub uid: String,
    /// Display name
    pub name: String,
    /// Email address (may be absent for some identity providers)
    #[serde(default)]
    pub email: Option<String>,
    /// Raw role string as stored; resolve with [`Role::resolve`]
    #[serde(default)]
    pub role: Option<String>,
    /// Soft-delete flag; excluded from rosters when true
    #[serde(default)]
    pub deleted: Option<bool>,
    /// Calendar year the student's class enrolled
    #[serde(default)]
    pub cohort_year: Option<i32>,
    /// When the profile was created (ISO 8601)
    pub created_at: String,
}

impl UserProfile {
    /// Resolved role, defaulting to student for anything unrecognized.
    pub fn resolved_role(&self) -> Role {
        Role::resolve(self.role.as_deref())
    }

    /// Whether this profile is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }
}

/// Resolved user role.
///
/// The stored `role` field is free-form text written by several app
/// versions; resolution trims, case-folds, and treats anything other
/// than "admin" as student (fail-safe default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    /// Resolve a raw role string; missing or unrecognized values are student.
    pub fn resolve(raw: Option<&str>) -> Role {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Student,
        }
    }

    /// Stored string form for the `role` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_resolution_normalizes() {
        assert_eq!(Role::resolve(Some(" Admin ")), Role::Admin);
        assert_eq!(Role::resolve(Some("ADMIN")), Role::Admin);
        assert_eq!(Role::resolve(Some("student")), Role::Student);
    }

    #[test]
    fn test_role_resolution_fails_safe() {
        assert_eq!(Role::resolve(Some("manager")), Role::Student);
        assert_eq!(Role::resolve(Some("")), Role::Student);
        assert_eq!(Role::resolve(None), Role::Student);
    }
}
