// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! A seeded store, signing keys, and caller identities shared by every
//! integration suite. See the crate docs for the seeded ids.

use std::sync::Arc;

use chrono::NaiveDate;
use ecm_api::auth::{Clock, FixedClock};
use ecm_api::{TokenKeys, TokenService};
use ecm_config::TokenAlgorithm;
use ecm_core::{
    Argon2Hasher, Department, DepartmentId, EcApplication, Evidence, HashVerifier, Identity,
    MemoryStore, Module, ModuleDecision, ModuleRequest, NewUser, RecordId, Role, RoleId,
    StudentInformation, UserId,
};

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct-horse-battery";

/// Issue time used with [`FixedClock`]: 2024-05-01T00:00:00Z.
pub const T0: i64 = 1_714_521_600;

// =============================================================================
// Keys
// =============================================================================

/// PEM fixtures shipped with ecm-api.
pub struct KeyFixtures;

impl KeyFixtures {
    /// RSA private key (PKCS#8).
    pub const RSA_PRIVATE: &'static [u8] = include_bytes!("../../../ecm-api/testdata/rsa_private.pem");
    /// RSA public key (SPKI).
    pub const RSA_PUBLIC: &'static [u8] = include_bytes!("../../../ecm-api/testdata/rsa_public.pem");
    /// A second, unrelated RSA private key.
    pub const RSA_OTHER_PRIVATE: &'static [u8] =
        include_bytes!("../../../ecm-api/testdata/rsa_other_private.pem");
    /// Public half of [`Self::RSA_OTHER_PRIVATE`].
    pub const RSA_OTHER_PUBLIC: &'static [u8] =
        include_bytes!("../../../ecm-api/testdata/rsa_other_public.pem");
    /// Ed25519 private key (PKCS#8).
    pub const ED25519_PRIVATE: &'static [u8] =
        include_bytes!("../../../ecm-api/testdata/ed25519_private.pem");
    /// Ed25519 public key (SPKI).
    pub const ED25519_PUBLIC: &'static [u8] =
        include_bytes!("../../../ecm-api/testdata/ed25519_public.pem");

    /// The primary RS256 key pair.
    pub fn rsa() -> TokenKeys {
        TokenKeys::from_pem(TokenAlgorithm::RS256, Self::RSA_PRIVATE, Self::RSA_PUBLIC)
            .expect("valid RSA fixture keys")
    }

    /// The unrelated RS256 key pair.
    pub fn rsa_other() -> TokenKeys {
        TokenKeys::from_pem(
            TokenAlgorithm::RS256,
            Self::RSA_OTHER_PRIVATE,
            Self::RSA_OTHER_PUBLIC,
        )
        .expect("valid RSA fixture keys")
    }

    /// The EdDSA key pair.
    pub fn ed25519() -> TokenKeys {
        TokenKeys::from_pem(TokenAlgorithm::EdDSA, Self::ED25519_PRIVATE, Self::ED25519_PUBLIC)
            .expect("valid Ed25519 fixture keys")
    }
}

/// Token service on the primary keys with the system clock.
pub fn token_service() -> TokenService {
    TokenService::new(KeyFixtures::rsa())
}

/// Token service on the primary keys with a clock pinned at [`T0`].
pub fn fixed_token_service() -> (Arc<FixedClock>, TokenService) {
    let clock = Arc::new(FixedClock::new(T0));
    let service = TokenService::new(KeyFixtures::rsa()).with_clock(clock.clone() as Arc<dyn Clock>);
    (clock, service)
}

// =============================================================================
// Identities
// =============================================================================

/// Callers matching the seeded accounts.
pub struct Callers;

impl Callers {
    /// User 1.
    pub fn admin() -> Identity {
        Identity::new(UserId::new(1), "admin@uni.test", Role::Administrator, DepartmentId::new(1))
    }

    /// User 2.
    pub fn staff() -> Identity {
        Identity::new(UserId::new(2), "staff@uni.test", Role::AcademicStaff, DepartmentId::new(1))
    }

    /// User 7, owner of application 100.
    pub fn student7() -> Identity {
        Identity::new(UserId::new(7), "s7@uni.test", Role::Student, DepartmentId::new(1))
    }

    /// User 8, owner of application 101.
    pub fn student8() -> Identity {
        Identity::new(UserId::new(8), "s8@uni.test", Role::Student, DepartmentId::new(2))
    }
}

// =============================================================================
// Store
// =============================================================================

/// A hasher with minimal cost so tests stay fast.
pub fn cheap_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(1024, 1, 1).expect("valid argon2 params")
}

/// Builds the seeded store described in the crate docs.
pub fn seeded_store() -> Arc<MemoryStore> {
    seed(MemoryStore::with_default_roles())
}

/// Seeded store whose password checks go through `verifier`.
pub fn seeded_store_with_verifier(verifier: Arc<dyn HashVerifier>) -> Arc<MemoryStore> {
    seed(MemoryStore::with_default_roles().with_verifier(verifier))
}

fn seed(store: MemoryStore) -> Arc<MemoryStore> {
    let hash = cheap_hasher().hash(PASSWORD).expect("hash fixture password");

    store.insert_department(Department {
        id: DepartmentId::new(1),
        name: "Computing".into(),
    });
    store.insert_department(Department {
        id: DepartmentId::new(2),
        name: "Law".into(),
    });
    store.insert_module(Module {
        code: "CS101".into(),
        name: "Programming".into(),
        department_id: DepartmentId::new(1),
    });

    for (id, email, role_id, department_id) in [
        (1, "admin@uni.test", 1, 1),
        (2, "staff@uni.test", 2, 1),
        (7, "s7@uni.test", 3, 1),
        (8, "s8@uni.test", 3, 2),
    ] {
        store
            .insert_user(
                UserId::new(id),
                NewUser {
                    name: format!("User {}", id),
                    email: email.to_string(),
                    password_hash: hash.clone(),
                    role_id: RoleId::new(role_id),
                    department_id: DepartmentId::new(department_id),
                    is_approved: true,
                },
            )
            .expect("seed user");
    }

    store.insert_application(application(100, 7));
    store.insert_application(application(101, 8));
    store.insert_evidence(Evidence {
        id: RecordId::new(200),
        file_name: "doctor-note.pdf".into(),
        ec_application_id: Some(RecordId::new(100)),
    });
    store.insert_evidence(Evidence {
        id: RecordId::new(201),
        file_name: "orphan.pdf".into(),
        ec_application_id: None,
    });
    store.insert_module_request(ModuleRequest {
        id: RecordId::new(300),
        requested_outcome: "Deadline extension".into(),
        related_assessment: Some("Coursework 1".into()),
        module_code: "CS101".into(),
        ec_application_id: Some(RecordId::new(100)),
    });
    store.insert_module_decision(ModuleDecision {
        id: RecordId::new(400),
        comments: Some("Approved for two weeks".into()),
        is_approved: true,
        module_request_id: RecordId::new(300),
        staff_member_id: UserId::new(2),
        ec_application_id: Some(RecordId::new(100)),
    });
    store.insert_student_information(StudentInformation {
        id: RecordId::new(500),
        has_health_issues: true,
        has_disability: false,
        has_lsp: false,
        additional_details: None,
        student_id: UserId::new(7),
    });

    Arc::new(store)
}

fn application(id: i64, student: i64) -> EcApplication {
    EcApplication {
        id: RecordId::new(id),
        circumstances_details: format!("Circumstances of student {}", student),
        affected_date_start: NaiveDate::from_ymd_opt(2024, 4, 1),
        affected_date_end: NaiveDate::from_ymd_opt(2024, 4, 14),
        submitted_on: NaiveDate::from_ymd_opt(2024, 4, 15).expect("valid date"),
        requires_further_evidence: false,
        is_referred: false,
        student_id: UserId::new(student),
    }
}
