// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization failures.

use ecm_core::DependencyError;
use thiserror::Error;

/// Result type alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failures of the token service, authenticator, and access policy.
///
/// Only [`AuthError::DependencyUnavailable`] is retryable; every other
/// variant is a terminal answer about the caller or the token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password, or malformed credentials.
    #[error("Invalid email or password")]
    AuthenticationFailure,

    /// Signature, structure, issuer, or claims did not verify.
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Diagnostic detail, never shown to clients.
        reason: String,
    },

    /// The token verified but `now > exp`.
    #[error("Token has expired")]
    ExpiredToken,

    /// The caller's role is not admitted for the action.
    #[error("Insufficient role")]
    InsufficientRole,

    /// The caller does not own the record.
    #[error("Access to this resource is forbidden")]
    Forbidden,

    /// The record, or its ownership chain, does not exist.
    #[error("Resource not found")]
    NotFound,

    /// A collaborator could not be reached.
    #[error(transparent)]
    DependencyUnavailable(#[from] DependencyError),

    /// Token signing failed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Key material could not be loaded.
    #[error("Key error: {0}")]
    Key(String),
}

impl AuthError {
    /// Creates an invalid token error.
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::DependencyUnavailable(_))
    }

    /// Returns `true` if the error means "who are you?" rather than "no".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::AuthenticationFailure
                | AuthError::InvalidToken { .. }
                | AuthError::ExpiredToken
        )
    }
}
