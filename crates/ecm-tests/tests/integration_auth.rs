// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token service and authenticator behaviour against the seeded store.

use std::sync::Arc;

use ecm_api::auth::{LoginFailure, LoginOutcome, DEFAULT_LIFETIME_SECS};
use ecm_api::{AuthError, Authenticator, Claims, TokenService};
use ecm_core::{Role, UNUSED_ACCOUNT_HASH};
use ecm_tests::prelude::*;

fn authenticator() -> (Arc<ecm_core::MemoryStore>, Authenticator) {
    let store = seeded_store();
    let auth = Authenticator::new(store.clone(), token_service());
    (store, auth)
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_then_identify() {
    init_test_logging();
    let (_, auth) = authenticator();

    let outcome = auth.login("s7@uni.test", PASSWORD).await.unwrap();
    let LoginOutcome::Success {
        identity,
        token,
        profile,
    } = outcome
    else {
        panic!("expected successful login");
    };

    assert_eq!(identity, Callers::student7());
    assert_eq!(profile.email, "s7@uni.test");

    let identified = auth.identify(&token).unwrap();
    assert_eq!(identified, identity);
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let (_, auth) = authenticator();

    let wrong_password = auth.login("s7@uni.test", "nope").await.unwrap();
    let unknown_email = auth.login("ghost@uni.test", PASSWORD).await.unwrap();

    let (LoginOutcome::Failure(a), LoginOutcome::Failure(b)) = (wrong_password, unknown_email)
    else {
        panic!("expected both logins to fail");
    };
    assert_eq!(a, LoginFailure::InvalidCredentials);
    assert_eq!(b, LoginFailure::InvalidCredentials);
    assert_eq!(
        a.into_error().to_string(),
        b.into_error().to_string()
    );
}

#[tokio::test]
async fn test_unknown_email_pays_for_a_hash_check() {
    let verifier = Arc::new(RecordingVerifier::default());
    let auth = Authenticator::new(seeded_store_with_verifier(verifier.clone()), token_service());

    let unknown = auth.login("ghost@uni.test", PASSWORD).await.unwrap();
    let wrong = auth.login("s7@uni.test", "nope").await.unwrap();
    assert!(matches!(unknown, LoginOutcome::Failure(LoginFailure::InvalidCredentials)));
    assert!(matches!(wrong, LoginOutcome::Failure(LoginFailure::InvalidCredentials)));

    let checked = verifier.checked();
    assert_eq!(checked.len(), 2);
    assert_eq!(checked[0], UNUSED_ACCOUNT_HASH);
    assert!(checked[1].starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
}

#[tokio::test]
async fn test_malformed_credentials() {
    let (_, auth) = authenticator();

    for (email, password) in [("", PASSWORD), ("s7@uni.test", ""), ("not-an-email", PASSWORD)] {
        let outcome = auth.login(email, password).await.unwrap();
        assert!(
            matches!(outcome, LoginOutcome::Failure(LoginFailure::MalformedCredentials)),
            "{email:?} / {password:?}"
        );
    }
}

#[tokio::test]
async fn test_login_email_match_is_exact() {
    let (_, auth) = authenticator();

    let outcome = auth.login("S7@UNI.TEST", PASSWORD).await.unwrap();
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_login_with_store_offline() {
    let (store, auth) = authenticator();
    store.set_available(false);

    let err = auth.login("s7@uni.test", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::DependencyUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_identify_needs_no_store() {
    let (store, auth) = authenticator();
    let token = token_service().issue(&Callers::staff()).unwrap();

    store.set_available(false);
    assert_eq!(auth.identify(&token).unwrap(), Callers::staff());
}

// =============================================================================
// Expiry
// =============================================================================

#[test]
fn test_expiry_boundary() {
    let (clock, service) = fixed_token_service();
    let token = service.issue(&Callers::admin()).unwrap();

    clock.set(T0 + DEFAULT_LIFETIME_SECS);
    assert!(service.decode(&token).is_ok());

    clock.set(T0 + DEFAULT_LIFETIME_SECS + 1);
    assert!(matches!(service.decode(&token), Err(AuthError::ExpiredToken)));
}

#[test]
fn test_expired_token_is_unauthenticated() {
    let (clock, service) = fixed_token_service();
    let token = service.issue(&Callers::student8()).unwrap();

    clock.advance(DEFAULT_LIFETIME_SECS + 60);
    let err = service.decode(&token).unwrap_err();
    assert!(err.is_unauthenticated());
}

// =============================================================================
// Integrity
// =============================================================================

#[test]
fn test_tampered_payload_is_rejected() {
    let service = token_service();
    let token = service.issue(&Callers::student7()).unwrap();

    // Original signature over a payload claiming admin.
    let mut claims = service.decode(&token).unwrap();
    claims.roles = Role::Administrator.authority();
    let forged_payload = service.sign(&claims).unwrap();

    let parts: Vec<&str> = token.split('.').collect();
    let forged_parts: Vec<&str> = forged_payload.split('.').collect();
    let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

    assert!(matches!(
        service.decode(&spliced),
        Err(AuthError::InvalidToken { .. })
    ));
}

#[test]
fn test_foreign_key_is_rejected() {
    let foreign = TokenService::new(KeyFixtures::rsa_other());
    let token = foreign.issue(&Callers::admin()).unwrap();

    assert!(matches!(
        token_service().decode(&token),
        Err(AuthError::InvalidToken { .. })
    ));
}

#[test]
fn test_garbage_is_rejected() {
    for token in ["", "abc", "a.b.c", "Bearer x"] {
        assert!(matches!(
            token_service().decode(token),
            Err(AuthError::InvalidToken { .. })
        ));
    }
}

#[test]
fn test_wrong_issuer_is_rejected() {
    let other_issuer = TokenService::with_settings(KeyFixtures::rsa(), "elsewhere", 3600);
    let token = other_issuer.issue(&Callers::staff()).unwrap();

    assert!(token_service().decode(&token).is_err());
}

#[test]
fn test_eddsa_round_trip() {
    let service = TokenService::new(KeyFixtures::ed25519());
    let token = service.issue(&Callers::staff()).unwrap();

    let claims = service.decode(&token).unwrap();
    assert_eq!(claims.identity().unwrap(), Callers::staff());

    // An RS256 verifier must not accept it.
    assert!(token_service().decode(&token).is_err());
}

// =============================================================================
// Claims
// =============================================================================

#[test]
fn test_claims_content() {
    let (_, service) = fixed_token_service();
    let token = service.issue(&Callers::student8()).unwrap();
    let claims: Claims = service.decode(&token).unwrap();

    assert_eq!(claims.iss, "self");
    assert_eq!(claims.sub, "s8@uni.test");
    assert_eq!(claims.iat, T0);
    assert_eq!(claims.exp, T0 + 86_400);
    assert_eq!(claims.roles, "ROLE_Student");
    assert_eq!(claims.user_id, Callers::student8().user_id);
    assert_eq!(claims.department_id, Callers::student8().department_id);
    assert!(!claims.jti.is_empty());
}

#[test]
fn test_each_token_has_unique_id() {
    let service = token_service();
    let a = service.decode(&service.issue(&Callers::admin()).unwrap()).unwrap();
    let b = service.decode(&service.issue(&Callers::admin()).unwrap()).unwrap();

    assert_ne!(a.jti, b.jti);
}
