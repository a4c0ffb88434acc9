// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identities, user records, and reference data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::types::{DepartmentId, RoleId, UserId};

// =============================================================================
// Identity
// =============================================================================

/// The authenticated caller.
///
/// An immutable snapshot taken from the stored user record at login and
/// carried inside the session token afterwards. It is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User id.
    pub user_id: UserId,
    /// Login email.
    pub email: String,
    /// Role at the time the snapshot was taken.
    pub role: Role,
    /// Department of the user.
    pub department_id: DepartmentId,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(
        user_id: UserId,
        email: impl Into<String>,
        role: Role,
        department_id: DepartmentId,
    ) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            department_id,
        }
    }
}

// =============================================================================
// UserRecord
// =============================================================================

/// A stored user account.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Primary key.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email (unique).
    pub email: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Whether staff have approved the account.
    pub is_approved: bool,
    /// Role row the account references.
    pub role_id: RoleId,
    /// Role resolved from `role_id`.
    pub role: Role,
    /// Department the account belongs to.
    pub department_id: DepartmentId,
}

impl UserRecord {
    /// Builds the identity snapshot for this account.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, &self.email, self.role, self.department_id)
    }

    /// Builds the public profile for this account.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            is_approved: self.is_approved,
            role_id: self.role_id,
            department_id: self.department_id,
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("department_id", &self.department_id)
            .field("is_approved", &self.is_approved)
            .finish_non_exhaustive()
    }
}

/// Public view of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Whether staff have approved the account.
    pub is_approved: bool,
    /// Role row id.
    pub role_id: RoleId,
    /// Department id.
    pub department_id: DepartmentId,
}

/// A user account to be created.
#[derive(Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Role row id.
    pub role_id: RoleId,
    /// Department id.
    pub department_id: DepartmentId,
    /// Initial approval flag.
    pub is_approved: bool,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("department_id", &self.department_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Reference Data
// =============================================================================

/// A role row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    /// Primary key.
    pub id: RoleId,
    /// Stored role name.
    pub name: String,
}

/// A department row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Primary key.
    pub id: DepartmentId,
    /// Department name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            id: UserId::new(7),
            name: "Ada".into(),
            email: "ada@uni.ac.uk".into(),
            password_hash: "$argon2id$secret".into(),
            is_approved: true,
            role_id: RoleId::new(3),
            role: Role::Student,
            department_id: DepartmentId::new(2),
        }
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let json = serde_json::to_value(record().profile()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["isApproved"], true);
        assert_eq!(json["roleId"], 3);
        assert_eq!(json["departmentId"], 2);
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_debug_hides_password_hash() {
        let debug = format!("{:?}", record());
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn test_identity_snapshot() {
        let identity = record().identity();
        assert_eq!(identity.user_id, UserId::new(7));
        assert_eq!(identity.role, Role::Student);
        assert_eq!(identity.department_id, DepartmentId::new(2));
    }
}
