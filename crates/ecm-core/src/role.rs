// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The closed set of roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// RoleTraits
// =============================================================================

/// Gate behaviour attached to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTraits {
    /// Passes every role-gate requirement.
    pub overrides_role_gate: bool,
    /// Skips the per-record ownership gate.
    pub bypasses_ownership: bool,
}

// =============================================================================
// Role
// =============================================================================

/// A user's role.
///
/// Role membership is the coarse-grained gate: every user has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full administrative access.
    #[serde(rename = "Administrator")]
    Administrator,
    /// Teaching and support staff who review cases.
    #[serde(rename = "Academic_Staff")]
    AcademicStaff,
    /// A student submitting applications.
    #[serde(rename = "Student")]
    Student,
}

impl Role {
    /// All roles, in seed order.
    pub const ALL: [Role; 3] = [Role::Administrator, Role::AcademicStaff, Role::Student];

    /// Prefix used when a role is carried as a granted authority.
    pub const AUTHORITY_PREFIX: &'static str = "ROLE_";

    /// Returns the stored role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::AcademicStaff => "Academic_Staff",
            Role::Student => "Student",
        }
    }

    /// Parses a stored role name. Matching ignores case.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
    }

    /// Returns the authority string, e.g. `ROLE_Academic_Staff`.
    pub fn authority(&self) -> String {
        format!("{}{}", Self::AUTHORITY_PREFIX, self.as_str())
    }

    /// Parses an authority string such as `ROLE_Student`.
    pub fn from_authority(authority: &str) -> Option<Self> {
        authority
            .strip_prefix(Self::AUTHORITY_PREFIX)
            .and_then(Self::parse)
    }

    /// Returns the gate behaviour for this role.
    pub const fn traits(&self) -> RoleTraits {
        match self {
            Role::Administrator => RoleTraits {
                overrides_role_gate: true,
                bypasses_ownership: true,
            },
            Role::AcademicStaff => RoleTraits {
                overrides_role_gate: false,
                bypasses_ownership: true,
            },
            Role::Student => RoleTraits {
                overrides_role_gate: false,
                bypasses_ownership: false,
            },
        }
    }

    /// Returns `true` if this role passes every role-gate requirement.
    pub const fn overrides_role_gate(&self) -> bool {
        self.traits().overrides_role_gate
    }

    /// Returns `true` if this role skips the ownership gate.
    pub const fn bypasses_ownership(&self) -> bool {
        self.traits().bypasses_ownership
    }

    /// Returns `true` for staff roles.
    pub const fn is_staff(&self) -> bool {
        matches!(self, Role::Administrator | Role::AcademicStaff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRoleName(pub String);

impl FromStr for Role {
    type Err = UnknownRoleName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRoleName(s.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(Role::AcademicStaff.as_str(), "Academic_Staff");
        assert_eq!(Role::parse("academic_staff"), Some(Role::AcademicStaff));
        assert_eq!(Role::parse("Administrator"), Some(Role::Administrator));
        assert_eq!(Role::parse("janitor"), None);
        assert!("Lecturer".parse::<Role>().is_err());
    }

    #[test]
    fn test_authority_round_trip() {
        assert_eq!(Role::Student.authority(), "ROLE_Student");
        assert_eq!(Role::from_authority("ROLE_Academic_Staff"), Some(Role::AcademicStaff));
        assert_eq!(Role::from_authority("Student"), None);
    }

    #[test]
    fn test_role_traits() {
        assert!(Role::Administrator.overrides_role_gate());
        assert!(!Role::AcademicStaff.overrides_role_gate());
        assert!(Role::AcademicStaff.bypasses_ownership());
        assert!(!Role::Student.bypasses_ownership());
        assert!(!Role::Student.is_staff());
    }

    #[test]
    fn test_role_serde_uses_stored_names() {
        let json = serde_json::to_string(&Role::AcademicStaff).unwrap();
        assert_eq!(json, "\"Academic_Staff\"");
    }
}
