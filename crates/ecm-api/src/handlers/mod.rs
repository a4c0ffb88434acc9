// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness
//! - [`auth`]: login, registration, current user
//! - [`applications`]: EC applications
//! - [`records`]: evidence, module requests and decisions, student information
//! - [`reference`]: roles, departments, modules

mod applications;
mod auth;
mod health;
mod records;
mod reference;

pub use applications::*;
pub use auth::*;
pub use health::*;
pub use records::*;
pub use reference::*;
