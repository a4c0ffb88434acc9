// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization.
//!
//! This module provides:
//! - Session token issuance and verification ([`TokenService`])
//! - Credential login and token identification ([`Authenticator`])
//! - The access policy engine ([`AccessPolicy`])
//! - The per-request authentication context

mod authenticator;
mod claims;
mod clock;
mod context;
mod error;
pub mod policy;
mod token;

pub use authenticator::{Authenticator, LoginFailure, LoginOutcome};
pub use claims::Claims;
pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{AuthContext, Caller};
pub use error::{AuthError, AuthResult};
pub use policy::{
    required_role, AccessPolicy, Decision, DenyReason, ResourceRef, RoleRequirement, Scope,
};
pub use token::{TokenKeys, TokenService, DEFAULT_ISSUER, DEFAULT_LIFETIME_SECS};
