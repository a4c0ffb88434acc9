// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for collaborator calls.
//!
//! # Error Hierarchy
//!
//! ```text
//! StoreError (writes)
//! ├── NotFound           - referenced record does not exist
//! ├── UnknownRole        - registration names a role that does not exist
//! ├── UnknownDepartment  - registration names a department that does not exist
//! ├── DuplicateEmail     - email already registered
//! ├── Duplicate          - natural key already taken
//! ├── InvalidInput       - a field failed validation
//! └── Dependency         - the backing store could not be reached
//!
//! DependencyError (reads)  - the backing store could not be reached
//! ```
//!
//! Reads never fail for "not found": they return `Ok(None)`. Only an
//! unreachable backend produces a [`DependencyError`], and callers must
//! propagate it rather than treat it as absence.

use thiserror::Error;

use crate::types::{DepartmentId, RoleId};

/// Result type alias for store writes.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// DependencyError
// =============================================================================

/// A collaborator (credential store, resource gateway) failed to answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{component} unavailable: {message}")]
pub struct DependencyError {
    /// Name of the failing component.
    pub component: String,
    /// Failure description.
    pub message: String,
}

impl DependencyError {
    /// Creates a new dependency error.
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Errors returned by store write operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The role id does not exist.
    #[error("Unknown role: {0}")]
    UnknownRole(RoleId),

    /// The department id does not exist.
    #[error("Unknown department: {0}")]
    UnknownDepartment(DepartmentId),

    /// The email is already registered.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// A record with the same natural key already exists.
    #[error("{entity} already exists: {key}")]
    Duplicate {
        /// Entity name.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// A field failed validation.
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput {
        /// Field name.
        field: &'static str,
        /// Error message.
        message: String,
    },

    /// The backing store is unavailable.
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if the failure is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Dependency(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_error_display() {
        let err = DependencyError::new("credential_store", "connection refused");
        assert_eq!(err.to_string(), "credential_store unavailable: connection refused");
    }

    #[test]
    fn test_only_dependency_failures_are_retryable() {
        assert!(StoreError::from(DependencyError::new("db", "down")).is_retryable());
        assert!(!StoreError::DuplicateEmail("a@b.com".into()).is_retryable());
        assert!(!StoreError::not_found("ec_application", 9).is_retryable());
    }
}
