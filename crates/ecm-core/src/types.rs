// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Strongly-typed identifiers.
//!
//! Every identifier in the persistence layer is an integer primary key. The
//! newtypes here keep a user id from being passed where a department id is
//! expected.
//!
//! # Examples
//!
//! ```
//! use ecm_core::types::{UserId, DepartmentId};
//!
//! let student = UserId::new(7);
//! assert_eq!(student.get(), 7);
//! assert_eq!(student.to_string(), "7");
//! assert_ne!(student.get(), DepartmentId::new(3).get());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier.
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw integer value.
            #[inline]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Primary key of a user account.
    UserId
);

numeric_id!(
    /// Primary key of a role row.
    RoleId
);

numeric_id!(
    /// Primary key of a department.
    DepartmentId
);

numeric_id!(
    /// Primary key of a case record (application, evidence, module request,
    /// module decision, or student information).
    RecordId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");

        let back: DepartmentId = serde_json::from_str("3").unwrap();
        assert_eq!(back, DepartmentId::new(3));
    }

    #[test]
    fn test_id_ordering() {
        assert!(RecordId::new(1) < RecordId::new(2));
    }
}
