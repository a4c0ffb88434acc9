// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ecm-core
//!
//! Core abstractions and shared types for the extenuating-circumstances
//! case-management backend.
//!
//! This crate provides the foundational types and traits used across all
//! ECM components:
//!
//! - **Types**: Identifiers such as `UserId`, `DepartmentId`, `RecordId`
//! - **Role**: The closed role enumeration and its gate behaviour
//! - **Identity**: Authenticated caller snapshot and user records
//! - **Resource**: Resource kinds, actions, and case records
//! - **Store**: Collaborator traits for credentials, ownership, and records
//! - **Memory**: An in-memory store implementing every collaborator trait
//! - **Password**: Argon2 password hashing
//! - **Audit**: Security audit logging
//!
//! ## Example
//!
//! ```rust,ignore
//! use ecm_core::{MemoryStore, Role, UserId, ResourceKind, RecordId, ResourceGateway};
//!
//! let store = MemoryStore::with_default_roles();
//! let owner = store.owner_student_id(ResourceKind::Evidence, RecordId::new(4)).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod audit;
pub mod error;
pub mod identity;
pub mod memory;
pub mod password;
pub mod resource;
pub mod role;
pub mod store;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{
    ActionResult, AuditAction, AuditLog, AuditLogger, AuditResource, AuditSeverity,
    InMemoryAuditLogger, NoOpAuditLogger, TracingAuditLogger,
};
pub use error::{DependencyError, StoreError, StoreResult};
pub use identity::{Department, Identity, NewUser, RoleInfo, UserProfile, UserRecord};
pub use memory::MemoryStore;
pub use password::{
    verify_account, verify_password, Argon2Hasher, Argon2Verifier, HashVerifier, PasswordError,
    UNUSED_ACCOUNT_HASH,
};
pub use resource::{
    Action, ApplicationFilter, EcApplication, EcApplicationPatch, Evidence, Module,
    ModuleDecision, ModulePatch, ModuleRequest, NewEcApplication, NewModuleDecision,
    NewModuleRequest, NewStudentInformation, ResourceKind, StudentInformation,
};
pub use role::{Role, RoleTraits, UnknownRoleName};
pub use store::{CredentialStore, RecordStore, ResourceGateway, UserDirectory};
pub use types::{DepartmentId, RecordId, RoleId, UserId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
