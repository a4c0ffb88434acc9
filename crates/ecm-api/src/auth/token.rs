// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session token issuance and verification.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use ecm_config::{TokenAlgorithm, TokenConfig};
use ecm_core::Identity;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::Claims;
use super::clock::{Clock, SystemClock};
use super::error::{AuthError, AuthResult};

/// Default token lifetime: 24 hours.
pub const DEFAULT_LIFETIME_SECS: i64 = 86_400;

/// Default issuer written into every token.
pub const DEFAULT_ISSUER: &str = "self";

// =============================================================================
// TokenKeys
// =============================================================================

/// An asymmetric key pair in the form the signer needs.
///
/// Loaded once at startup; immutable afterwards.
#[derive(Clone)]
pub struct TokenKeys {
    algorithm: Algorithm,
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    /// Parses a PEM key pair for `algorithm`.
    pub fn from_pem(
        algorithm: TokenAlgorithm,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> AuthResult<Self> {
        let (algorithm, encoding, decoding) = match algorithm {
            TokenAlgorithm::RS256 => (
                Algorithm::RS256,
                EncodingKey::from_rsa_pem(private_pem),
                DecodingKey::from_rsa_pem(public_pem),
            ),
            TokenAlgorithm::EdDSA => (
                Algorithm::EdDSA,
                EncodingKey::from_ed_pem(private_pem),
                DecodingKey::from_ed_pem(public_pem),
            ),
        };

        let encoding =
            encoding.map_err(|e| AuthError::Key(format!("invalid private key: {}", e)))?;
        let decoding =
            decoding.map_err(|e| AuthError::Key(format!("invalid public key: {}", e)))?;

        Ok(Self {
            algorithm,
            encoding: Arc::new(encoding),
            decoding: Arc::new(decoding),
        })
    }

    /// Reads a PEM key pair from disk.
    pub fn from_files(
        algorithm: TokenAlgorithm,
        private_path: &Path,
        public_path: &Path,
    ) -> AuthResult<Self> {
        let private_pem = fs::read(private_path).map_err(|e| {
            AuthError::Key(format!("cannot read '{}': {}", private_path.display(), e))
        })?;
        let public_pem = fs::read(public_path).map_err(|e| {
            AuthError::Key(format!("cannot read '{}': {}", public_path.display(), e))
        })?;
        Self::from_pem(algorithm, &private_pem, &public_pem)
    }

    /// Returns the signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TokenService
// =============================================================================

/// Issues and verifies signed, stateless session tokens.
///
/// This is the single trust boundary for tokens: nothing else in the crate
/// inspects a token string.
#[derive(Clone)]
pub struct TokenService {
    keys: TokenKeys,
    issuer: Arc<str>,
    lifetime_secs: i64,
    clock: Arc<dyn Clock>,
    validation: Arc<Validation>,
}

impl TokenService {
    /// Creates a service with the default issuer, a 24 hour lifetime, and
    /// the system clock.
    pub fn new(keys: TokenKeys) -> Self {
        Self::with_settings(keys, DEFAULT_ISSUER, DEFAULT_LIFETIME_SECS)
    }

    /// Creates a service with an explicit issuer and lifetime.
    pub fn with_settings(keys: TokenKeys, issuer: &str, lifetime_secs: i64) -> Self {
        // Expiry is checked against the injected clock, not by the decoder.
        let mut validation = Validation::new(keys.algorithm());
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["iss", "sub", "iat", "exp"]);

        Self {
            keys,
            issuer: Arc::from(issuer),
            lifetime_secs,
            clock: Arc::new(SystemClock),
            validation: Arc::new(validation),
        }
    }

    /// Creates a service from configuration, loading the key files.
    pub fn from_config(config: &TokenConfig) -> AuthResult<Self> {
        let keys = TokenKeys::from_files(
            config.algorithm,
            &config.private_key_path,
            &config.public_key_path,
        )?;
        let lifetime = i64::try_from(config.lifetime_secs)
            .map_err(|_| AuthError::Key("token lifetime out of range".to_string()))?;
        Ok(Self::with_settings(keys, &config.issuer, lifetime))
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Signs a token asserting `identity`.
    pub fn issue(&self, identity: &Identity) -> AuthResult<String> {
        let claims = Claims::for_identity(
            identity,
            self.issuer.as_ref(),
            self.clock.now(),
            self.lifetime_secs,
        );
        self.sign(&claims)
    }

    /// Signs arbitrary claims with the private key.
    pub fn sign(&self, claims: &Claims) -> AuthResult<String> {
        let header = Header::new(self.keys.algorithm());
        encode(&header, claims, &self.keys.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Fails with `InvalidToken` when the signature, structure, or issuer do
    /// not verify and with `ExpiredToken` when `now > exp`.
    pub fn decode(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.keys.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::invalid_token(e.to_string())
        })?;

        let claims = data.claims;
        if claims.is_expired_at(self.clock.now()) {
            tracing::debug!(sub = %claims.sub, exp = claims.exp, "Token expired");
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }

    /// Returns the configured token lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Returns the issuer.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("algorithm", &self.keys.algorithm())
            .field("lifetime_secs", &self.lifetime_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::FixedClock;
    use ecm_core::{DepartmentId, Role, UserId};

    const RSA_PRIVATE: &[u8] = include_bytes!("../../testdata/rsa_private.pem");
    const RSA_PUBLIC: &[u8] = include_bytes!("../../testdata/rsa_public.pem");
    const RSA_OTHER_PRIVATE: &[u8] = include_bytes!("../../testdata/rsa_other_private.pem");
    const RSA_OTHER_PUBLIC: &[u8] = include_bytes!("../../testdata/rsa_other_public.pem");
    const ED_PRIVATE: &[u8] = include_bytes!("../../testdata/ed25519_private.pem");
    const ED_PUBLIC: &[u8] = include_bytes!("../../testdata/ed25519_public.pem");

    const T0: i64 = 1_700_000_000;

    fn rsa_keys() -> TokenKeys {
        TokenKeys::from_pem(TokenAlgorithm::RS256, RSA_PRIVATE, RSA_PUBLIC).unwrap()
    }

    fn staff() -> Identity {
        Identity::new(
            UserId::new(2),
            "staff@uni.test",
            Role::AcademicStaff,
            DepartmentId::new(1),
        )
    }

    fn service_at(clock: Arc<FixedClock>) -> TokenService {
        TokenService::new(rsa_keys()).with_clock(clock)
    }

    #[test]
    fn test_issue_and_decode() {
        let clock = Arc::new(FixedClock::new(T0));
        let service = service_at(clock);

        let token = service.issue(&staff()).unwrap();
        let claims = service.decode(&token).unwrap();

        assert_eq!(claims.sub, "staff@uni.test");
        assert_eq!(claims.iss, "self");
        assert_eq!(claims.iat, T0);
        assert_eq!(claims.exp, T0 + 86_400);
        assert_eq!(claims.roles, "ROLE_Academic_Staff");
        assert_eq!(claims.identity().unwrap(), staff());
    }

    #[test]
    fn test_expiry_boundary() {
        let clock = Arc::new(FixedClock::new(T0));
        let service = service_at(clock.clone());
        let token = service.issue(&staff()).unwrap();

        clock.set(T0 + 86_400 - 1);
        assert!(service.decode(&token).is_ok());

        clock.set(T0 + 86_400);
        assert!(service.decode(&token).is_ok());

        clock.set(T0 + 86_400 + 1);
        assert!(matches!(service.decode(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = service_at(Arc::new(FixedClock::new(T0)));
        let token = service.issue(&staff()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut payload: Vec<char> = parts[1].chars().collect();
        payload[10] = if payload[10] == 'A' { 'B' } else { 'A' };
        parts[1] = payload.into_iter().collect();
        let tampered = parts.join(".");

        assert!(matches!(
            service.decode(&tampered),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    const B64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    /// Replaces the character at `index` with the one whose 6-bit value
    /// differs in the top bit, which is never a padding bit.
    fn flip_char(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        let value = B64URL.iter().position(|&c| c == bytes[index]).unwrap();
        bytes[index] = B64URL[value ^ 32];
        String::from_utf8(bytes).unwrap()
    }

    fn assert_every_flip_rejected(service: &TokenService, token: &str) {
        assert!(service.decode(token).is_ok());
        for (index, byte) in token.bytes().enumerate() {
            if byte == b'.' {
                continue;
            }
            let altered = flip_char(token, index);
            assert!(
                matches!(service.decode(&altered), Err(AuthError::InvalidToken { .. })),
                "altered character at {} was accepted",
                index
            );
        }
    }

    #[test]
    fn test_every_altered_character_rejected_rs256() {
        let service = service_at(Arc::new(FixedClock::new(T0)));
        let token = service.issue(&staff()).unwrap();
        assert_every_flip_rejected(&service, &token);
    }

    #[test]
    fn test_every_altered_character_rejected_eddsa() {
        let keys = TokenKeys::from_pem(TokenAlgorithm::EdDSA, ED_PRIVATE, ED_PUBLIC).unwrap();
        let service = TokenService::new(keys).with_clock(Arc::new(FixedClock::new(T0)));
        let token = service.issue(&staff()).unwrap();
        assert_every_flip_rejected(&service, &token);
    }

    #[test]
    fn test_foreign_key_rejected() {
        let clock = Arc::new(FixedClock::new(T0));
        let ours = service_at(clock.clone());
        let theirs = TokenService::new(
            TokenKeys::from_pem(TokenAlgorithm::RS256, RSA_OTHER_PRIVATE, RSA_OTHER_PUBLIC)
                .unwrap(),
        )
        .with_clock(clock);

        let token = theirs.issue(&staff()).unwrap();
        assert!(matches!(
            ours.decode(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let clock = Arc::new(FixedClock::new(T0));
        let ours = service_at(clock.clone());
        let other_issuer =
            TokenService::with_settings(rsa_keys(), "someone-else", 3600).with_clock(clock);

        let token = other_issuer.issue(&staff()).unwrap();
        assert!(matches!(
            ours.decode(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let service = service_at(Arc::new(FixedClock::new(T0)));
        assert!(matches!(
            service.decode("not-a-token"),
            Err(AuthError::InvalidToken { .. })
        ));
        assert!(matches!(
            service.decode(""),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_eddsa_keys() {
        let keys = TokenKeys::from_pem(TokenAlgorithm::EdDSA, ED_PRIVATE, ED_PUBLIC).unwrap();
        let service = TokenService::new(keys).with_clock(Arc::new(FixedClock::new(T0)));

        let token = service.issue(&staff()).unwrap();
        assert_eq!(service.decode(&token).unwrap().user_id, UserId::new(2));
    }

    #[test]
    fn test_bad_pem_is_key_error() {
        let result = TokenKeys::from_pem(TokenAlgorithm::RS256, b"nope", RSA_PUBLIC);
        assert!(matches!(result, Err(AuthError::Key(_))));
    }
}
