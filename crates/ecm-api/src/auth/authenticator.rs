// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential login and token identification.

use std::sync::Arc;

use ecm_core::{CredentialStore, Identity, UserProfile};

use super::error::{AuthError, AuthResult};
use super::token::TokenService;

// =============================================================================
// LoginOutcome
// =============================================================================

/// Why a login was refused. Never shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// Empty or structurally invalid input.
    MalformedCredentials,
}

impl LoginFailure {
    /// Returns the public error, identical for every reason.
    pub fn into_error(self) -> AuthError {
        AuthError::AuthenticationFailure
    }

    /// Returns the reason as a string for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginFailure::InvalidCredentials => "invalid_credentials",
            LoginFailure::MalformedCredentials => "malformed_credentials",
        }
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Credentials verified; a token was issued.
    Success {
        /// Who logged in.
        identity: Identity,
        /// Signed session token.
        token: String,
        /// Public profile for the response body.
        profile: UserProfile,
    },
    /// Credentials rejected.
    Failure(LoginFailure),
}

impl LoginOutcome {
    /// Returns `true` for a successful login.
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }
}

// =============================================================================
// Authenticator
// =============================================================================

/// Verifies credentials at login and identifies callers from tokens.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    tokens: TokenService,
}

impl Authenticator {
    /// Creates an authenticator.
    pub fn new(credentials: Arc<dyn CredentialStore>, tokens: TokenService) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Checks credentials and issues a token.
    ///
    /// Returns `Err` only when a collaborator fails; a rejected login is
    /// `Ok(LoginOutcome::Failure(_))`.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() || !email.contains('@') {
            return Ok(LoginOutcome::Failure(LoginFailure::MalformedCredentials));
        }

        let Some(user) = self.credentials.verify_credentials(email, password).await? else {
            tracing::debug!(email = %email, "Credentials rejected");
            return Ok(LoginOutcome::Failure(LoginFailure::InvalidCredentials));
        };

        let identity = user.identity();
        let token = self.tokens.issue(&identity)?;

        tracing::info!(user_id = %identity.user_id, role = %identity.role, "User logged in");

        Ok(LoginOutcome::Success {
            identity,
            token,
            profile: user.profile(),
        })
    }

    /// Rebuilds the caller's identity from a token without a store lookup.
    pub fn identify(&self, token: &str) -> AuthResult<Identity> {
        self.tokens.decode(token)?.identity()
    }

    /// Loads the current profile of an identified caller.
    ///
    /// A token whose account no longer exists is treated as invalid.
    pub async fn current_profile(&self, identity: &Identity) -> AuthResult<UserProfile> {
        match self.credentials.find_by_id(identity.user_id).await? {
            Some(user) => Ok(user.profile()),
            None => Err(AuthError::invalid_token("account no longer exists")),
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{FixedClock, TokenKeys};
    use ecm_config::TokenAlgorithm;
    use ecm_core::{Argon2Hasher, DepartmentId, MemoryStore, NewUser, Role, RoleId, UserId};

    fn fixture() -> (Arc<MemoryStore>, Authenticator) {
        let store = Arc::new(MemoryStore::with_default_roles());
        store.insert_department(ecm_core::Department {
            id: DepartmentId::new(1),
            name: "Computer Science".into(),
        });
        let hasher = Argon2Hasher::with_params(1024, 1, 1).unwrap();
        store
            .insert_user(
                UserId::new(7),
                NewUser {
                    name: "Student Seven".into(),
                    email: "s7@uni.test".into(),
                    password_hash: hasher.hash("hunter22").unwrap(),
                    role_id: RoleId::new(3),
                    department_id: DepartmentId::new(1),
                    is_approved: true,
                },
            )
            .unwrap();

        let keys = TokenKeys::from_pem(
            TokenAlgorithm::RS256,
            include_bytes!("../../testdata/rsa_private.pem"),
            include_bytes!("../../testdata/rsa_public.pem"),
        )
        .unwrap();
        let tokens = TokenService::new(keys).with_clock(Arc::new(FixedClock::new(1_700_000_000)));

        (store.clone(), Authenticator::new(store, tokens))
    }

    #[tokio::test]
    async fn test_login_then_identify() {
        let (_, auth) = fixture();

        let outcome = auth.login("s7@uni.test", "hunter22").await.unwrap();
        let LoginOutcome::Success {
            identity, token, ..
        } = outcome
        else {
            panic!("expected success");
        };

        assert_eq!(identity.role, Role::Student);
        assert_eq!(auth.identify(&token).unwrap(), identity);
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let (_, auth) = fixture();

        let wrong_password = auth.login("s7@uni.test", "nope").await.unwrap();
        let unknown_email = auth.login("ghost@uni.test", "hunter22").await.unwrap();
        let malformed = auth.login("", "").await.unwrap();

        for outcome in [wrong_password, unknown_email, malformed] {
            let LoginOutcome::Failure(reason) = outcome else {
                panic!("expected failure");
            };
            assert!(matches!(
                reason.into_error(),
                AuthError::AuthenticationFailure
            ));
        }
    }

    #[tokio::test]
    async fn test_store_outage_is_an_error() {
        let (store, auth) = fixture();
        store.set_available(false);

        let result = auth.login("s7@uni.test", "hunter22").await;
        assert!(matches!(result, Err(AuthError::DependencyUnavailable(_))));
    }

    #[tokio::test]
    async fn test_current_profile() {
        let (_, auth) = fixture();
        let identity = Identity::new(
            UserId::new(7),
            "s7@uni.test",
            Role::Student,
            DepartmentId::new(1),
        );
        assert_eq!(auth.current_profile(&identity).await.unwrap().id, UserId::new(7));

        let ghost = Identity::new(
            UserId::new(99),
            "ghost@uni.test",
            Role::Student,
            DepartmentId::new(1),
        );
        assert!(matches!(
            auth.current_profile(&ghost).await,
            Err(AuthError::InvalidToken { .. })
        ));
    }
}
