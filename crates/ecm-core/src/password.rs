// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing with Argon2.
//!
//! Hashes are stored as PHC strings, so the parameters a hash was produced
//! with travel with it and verification does not depend on the current
//! hasher configuration.

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

// =============================================================================
// PasswordError
// =============================================================================

/// Password hashing errors.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The OS random source failed.
    #[error("Failed to generate salt: {0}")]
    Salt(String),

    /// Argon2 rejected the parameters or input.
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// The password is empty.
    #[error("Password must not be empty")]
    Empty,
}

// =============================================================================
// Argon2Hasher
// =============================================================================

/// Produces Argon2id PHC hashes.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Creates a hasher with the library's default parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Creates a hasher with explicit cost parameters.
    ///
    /// `memory_kib` is the memory cost, `iterations` the time cost.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(Self { params })
    }

    /// Hashes a password into a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Empty);
        }

        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks a password against a PHC hash.
///
/// A malformed hash never matches.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Account verification
// =============================================================================

/// Hash checked when no account matches, so a miss costs the same as a
/// wrong password. Its parameters equal [`Argon2Hasher::new`]; no password
/// maps to its digest.
pub const UNUSED_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$RQThhnDFAT/fzggWISDj5A$Cz7sTrUdZvOgFgH2FnNlQHRG72G/xhpSFZiVgJ5FACU";

/// Checks passwords against stored PHC hashes.
pub trait HashVerifier: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `password` matches `hash`.
    fn verify(&self, hash: &str, password: &str) -> bool;
}

/// [`HashVerifier`] backed by [`verify_password`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl HashVerifier for Argon2Verifier {
    fn verify(&self, hash: &str, password: &str) -> bool {
        verify_password(hash, password)
    }
}

/// Verifies a login attempt against the account's stored hash.
///
/// Exactly one hash check runs whether or not an account was found. With
/// no account the result is always `false`.
pub fn verify_account(verifier: &dyn HashVerifier, stored: Option<&str>, password: &str) -> bool {
    match stored {
        Some(hash) => verifier.verify(hash, password),
        None => {
            let _ = verifier.verify(UNUSED_ACCOUNT_HASH, password);
            false
        }
    }
}
