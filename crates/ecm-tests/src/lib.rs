// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ECM Integration Tests
//!
//! Integration tests for the EC case-management backend, plus the shared
//! fixtures they run against.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Seeded store, key pairs, and caller identities
//!   - `mocks`: Failing and call-counting ownership gateways
//!   - `harness`: An in-process router with request helpers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ecm-tests
//! cargo test -p ecm-tests --test integration_auth
//! cargo test -p ecm-tests --test integration_policy
//! cargo test -p ecm-tests --test integration_api
//! cargo test -p ecm-tests --test integration_config
//! ```
//!
//! ## Seeded Data
//!
//! | id  | record                | owner / parent            |
//! |-----|-----------------------|---------------------------|
//! | 1   | admin@uni.test        | Administrator, dept 1     |
//! | 2   | staff@uni.test        | Academic_Staff, dept 1    |
//! | 7   | s7@uni.test           | Student, dept 1           |
//! | 8   | s8@uni.test           | Student, dept 2           |
//! | 100 | EC application        | student 7                 |
//! | 101 | EC application        | student 8                 |
//! | 200 | evidence              | application 100           |
//! | 201 | evidence              | no application            |
//! | 300 | module request        | application 100           |
//! | 400 | module decision       | module request 300        |
//! | 500 | student information   | student 7                 |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::init_test_logging;
}
