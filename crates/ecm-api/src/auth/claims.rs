// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session token claims.

use chrono::{DateTime, Utc};
use ecm_core::{DepartmentId, Identity, Role, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};

/// Claims carried by a session token.
///
/// `sub` is the login email. The role travels as a space-joined list of
/// `ROLE_`-prefixed authorities so that the wire form matches what other
/// consumers of the token already expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Registered Claims (RFC 7519)
    // =========================================================================
    /// Issuer.
    pub iss: String,

    /// Subject: the user's email.
    pub sub: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Token id.
    pub jti: String,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Space-joined authorities, e.g. `ROLE_Student`.
    pub roles: String,

    /// User id.
    #[serde(rename = "userId")]
    pub user_id: UserId,

    /// Department id.
    #[serde(rename = "departmentId")]
    pub department_id: DepartmentId,
}

impl Claims {
    /// Builds claims for an identity, valid from `issued_at` for `lifetime_secs`.
    pub fn for_identity(
        identity: &Identity,
        issuer: impl Into<String>,
        issued_at: i64,
        lifetime_secs: i64,
    ) -> Self {
        Self {
            iss: issuer.into(),
            sub: identity.email.clone(),
            iat: issued_at,
            exp: issued_at + lifetime_secs,
            jti: Uuid::now_v7().to_string(),
            roles: identity.role.authority(),
            user_id: identity.user_id,
            department_id: identity.department_id,
        }
    }

    /// Iterates over the authorities in the `roles` claim.
    pub fn authorities(&self) -> impl Iterator<Item = &str> {
        self.roles.split_whitespace()
    }

    /// Returns the role named by the first recognised authority.
    pub fn role(&self) -> Option<Role> {
        self.authorities().find_map(Role::from_authority)
    }

    /// Rebuilds the identity the token asserts.
    pub fn identity(&self) -> AuthResult<Identity> {
        let role = self
            .role()
            .ok_or_else(|| AuthError::invalid_token(format!("unknown roles '{}'", self.roles)))?;
        if self.sub.trim().is_empty() {
            return Err(AuthError::invalid_token("empty subject"));
        }
        Ok(Identity::new(
            self.user_id,
            &self.sub,
            role,
            self.department_id,
        ))
    }

    /// Returns `true` if the token has expired at `now`.
    ///
    /// A token is still valid at the exact second of `exp`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Identity {
        Identity::new(
            UserId::new(7),
            "s7@uni.test",
            Role::Student,
            DepartmentId::new(1),
        )
    }

    #[test]
    fn test_claims_for_identity() {
        let claims = Claims::for_identity(&student(), "self", 1_000, 86_400);

        assert_eq!(claims.iss, "self");
        assert_eq!(claims.sub, "s7@uni.test");
        assert_eq!(claims.exp, 87_400);
        assert_eq!(claims.roles, "ROLE_Student");
        assert_eq!(claims.identity().unwrap(), student());
    }

    #[test]
    fn test_wire_names() {
        let claims = Claims::for_identity(&student(), "self", 0, 10);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["userId"], 7);
        assert_eq!(json["departmentId"], 1);
        assert_eq!(json["roles"], "ROLE_Student");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_unknown_role_is_invalid() {
        let mut claims = Claims::for_identity(&student(), "self", 0, 10);
        claims.roles = "ROLE_Janitor".into();

        assert!(matches!(
            claims.identity(),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_expiry_is_inclusive_of_exp() {
        let claims = Claims::for_identity(&student(), "self", 100, 50);
        assert!(!claims.is_expired_at(150));
        assert!(claims.is_expired_at(151));
    }
}
