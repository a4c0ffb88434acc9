// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Collaborator traits for the persistence layer.
//!
//! The authentication and authorization subsystem only ever talks to storage
//! through these traits:
//!
//! - [`CredentialStore`]: credential verification and user lookup
//! - [`UserDirectory`]: registration and reference data
//! - [`ResourceGateway`]: ownership-chain resolution
//! - [`RecordStore`]: the record reads and writes the HTTP routes need
//!
//! Every call is fallible with a [`DependencyError`] when the backend cannot
//! be reached. Absence is `Ok(None)`, never an error.

use async_trait::async_trait;

use crate::error::{DependencyError, StoreResult};
use crate::identity::{Department, NewUser, RoleInfo, UserRecord};
use crate::resource::{
    ApplicationFilter, EcApplication, EcApplicationPatch, Evidence, Module, ModuleDecision,
    ModulePatch, ModuleRequest, NewEcApplication, NewModuleDecision, NewModuleRequest,
    NewStudentInformation, ResourceKind, StudentInformation,
};
use crate::types::{RecordId, UserId};

// =============================================================================
// CredentialStore
// =============================================================================

/// Source of truth for user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the user if `password` matches the stored hash for `email`.
    ///
    /// Unknown email and wrong password both return `Ok(None)`.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, DependencyError>;

    /// Looks up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DependencyError>;
}

// =============================================================================
// UserDirectory
// =============================================================================

/// Registration and reference data.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Creates a user account.
    ///
    /// Fails with `UnknownRole`, `UnknownDepartment`, or `DuplicateEmail`.
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Lists all roles.
    async fn list_roles(&self) -> Result<Vec<RoleInfo>, DependencyError>;

    /// Lists all departments.
    async fn list_departments(&self) -> Result<Vec<Department>, DependencyError>;
}

// =============================================================================
// ResourceGateway
// =============================================================================

/// Resolves ownership chains.
///
/// Implementors answer the single-hop questions; [`owner_student_id`]
/// composes them so that nested records and applications resolve through
/// the same path.
///
/// [`owner_student_id`]: ResourceGateway::owner_student_id
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Returns the student owning an application.
    ///
    /// `None` if the application does not exist or has been withdrawn.
    async fn application_owner(&self, id: RecordId) -> Result<Option<UserId>, DependencyError>;

    /// Returns the application a nested record belongs to.
    ///
    /// `None` if the record does not exist or its reference is empty.
    async fn parent_application(
        &self,
        kind: ResourceKind,
        id: RecordId,
    ) -> Result<Option<RecordId>, DependencyError>;

    /// Returns the student owning a student-information record.
    async fn student_information_owner(
        &self,
        id: RecordId,
    ) -> Result<Option<UserId>, DependencyError>;

    /// Resolves any ownership-subject record to its owning student.
    ///
    /// Kinds that are not ownership subjects resolve to `None`.
    async fn owner_student_id(
        &self,
        kind: ResourceKind,
        id: RecordId,
    ) -> Result<Option<UserId>, DependencyError> {
        match kind {
            ResourceKind::EcApplication => self.application_owner(id).await,
            ResourceKind::StudentInformation => self.student_information_owner(id).await,
            ResourceKind::Evidence | ResourceKind::ModuleRequest | ResourceKind::ModuleDecision => {
                match self.parent_application(kind, id).await? {
                    Some(application_id) => self.application_owner(application_id).await,
                    None => Ok(None),
                }
            }
            ResourceKind::Module
            | ResourceKind::Department
            | ResourceKind::Role
            | ResourceKind::User => Ok(None),
        }
    }
}

// =============================================================================
// RecordStore
// =============================================================================

/// Case records behind the HTTP routes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates an application dated today.
    async fn create_application(&self, new: NewEcApplication) -> StoreResult<EcApplication>;

    /// Fetches an application.
    async fn get_application(&self, id: RecordId)
        -> Result<Option<EcApplication>, DependencyError>;

    /// Applies a partial update to an application.
    async fn update_application(
        &self,
        id: RecordId,
        patch: EcApplicationPatch,
    ) -> StoreResult<EcApplication>;

    /// Lists applications matching a filter, ordered by id.
    async fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<EcApplication>, DependencyError>;

    /// Fetches an evidence record.
    async fn get_evidence(&self, id: RecordId) -> Result<Option<Evidence>, DependencyError>;

    /// Creates a module request under an application.
    async fn create_module_request(&self, new: NewModuleRequest) -> StoreResult<ModuleRequest>;

    /// Fetches a module request.
    async fn get_module_request(
        &self,
        id: RecordId,
    ) -> Result<Option<ModuleRequest>, DependencyError>;

    /// Records a decision on a module request.
    async fn create_module_decision(&self, new: NewModuleDecision)
        -> StoreResult<ModuleDecision>;

    /// Fetches a module decision.
    async fn get_module_decision(
        &self,
        id: RecordId,
    ) -> Result<Option<ModuleDecision>, DependencyError>;

    /// Creates student information.
    async fn create_student_information(
        &self,
        new: NewStudentInformation,
    ) -> StoreResult<StudentInformation>;

    /// Fetches student information.
    async fn get_student_information(
        &self,
        id: RecordId,
    ) -> Result<Option<StudentInformation>, DependencyError>;

    /// Creates a module.
    async fn create_module(&self, module: Module) -> StoreResult<Module>;

    /// Applies a partial update to a module.
    async fn update_module(&self, code: &str, patch: ModulePatch) -> StoreResult<Module>;
}
