// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request authentication context.

use std::net::IpAddr;

use ecm_core::{Identity, Role, UserId};
use uuid::Uuid;

/// Authentication context attached to a request by the auth middleware.
///
/// Public routes carry an anonymous context so that the request id and
/// client address are available to every handler.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The verified caller, if any.
    pub identity: Option<Identity>,
    /// Request ID for tracing and audit correlation.
    pub request_id: Uuid,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
}

impl AuthContext {
    /// Creates a context for a verified caller.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Creates an anonymous context.
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if no caller was verified.
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Returns the caller's user id.
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.as_ref().map(|i| i.user_id)
    }

    /// Returns the caller's role.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    /// Converts into a [`Caller`] if an identity was verified.
    pub fn into_caller(self) -> Option<Caller> {
        let identity = self.identity?;
        Some(Caller {
            identity,
            request_id: self.request_id,
            client_ip: self.client_ip,
        })
    }
}

// =============================================================================
// Caller
// =============================================================================

/// A verified caller on a protected route.
#[derive(Debug, Clone)]
pub struct Caller {
    /// The verified identity.
    pub identity: Identity,
    /// Request ID for tracing and audit correlation.
    pub request_id: Uuid,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
}

impl Caller {
    /// Returns the caller's user id.
    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    /// Returns the caller's role.
    pub fn role(&self) -> Role {
        self.identity.role
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecm_core::DepartmentId;

    #[test]
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();
        assert!(ctx.is_anonymous());
        assert!(ctx.user_id().is_none());
    }

    #[test]
    fn test_authenticated_context() {
        let identity = Identity::new(
            UserId::new(1),
            "admin@uni.test",
            Role::Administrator,
            DepartmentId::new(1),
        );
        let ctx = AuthContext::authenticated(identity).with_client_ip("10.0.0.1".parse().ok());

        assert!(!ctx.is_anonymous());
        assert_eq!(ctx.role(), Some(Role::Administrator));
        assert_eq!(ctx.client_ip, Some("10.0.0.1".parse().unwrap()));

        let caller = ctx.into_caller().unwrap();
        assert_eq!(caller.user_id(), UserId::new(1));
        assert!(AuthContext::anonymous().into_caller().is_none());
    }
}
