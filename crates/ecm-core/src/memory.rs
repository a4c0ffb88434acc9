// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store implementing every collaborator trait.
//!
//! Used by the binary when no external database is configured and by the
//! test suites. Tables live behind a single `RwLock`; no lock is held
//! across an `.await`.
//!
//! The store can be switched unavailable with [`MemoryStore::set_available`],
//! after which every call fails with a [`DependencyError`]. This is how the
//! dependency-failure paths are exercised.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{DependencyError, StoreError, StoreResult};
use crate::identity::{Department, NewUser, RoleInfo, UserRecord};
use crate::password::{verify_account, Argon2Verifier, HashVerifier};
use crate::resource::{
    ApplicationFilter, EcApplication, EcApplicationPatch, Evidence, Module, ModuleDecision,
    ModulePatch, ModuleRequest, NewEcApplication, NewModuleDecision, NewModuleRequest,
    NewStudentInformation, ResourceKind, StudentInformation,
};
use crate::role::Role;
use crate::store::{CredentialStore, RecordStore, ResourceGateway, UserDirectory};
use crate::types::{DepartmentId, RecordId, RoleId, UserId};

const COMPONENT: &str = "memory_store";

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    roles: BTreeMap<RoleId, RoleInfo>,
    departments: BTreeMap<DepartmentId, Department>,
    users: BTreeMap<UserId, UserRecord>,
    applications: BTreeMap<RecordId, EcApplication>,
    withdrawn: HashSet<RecordId>,
    evidence: BTreeMap<RecordId, Evidence>,
    module_requests: BTreeMap<RecordId, ModuleRequest>,
    module_decisions: BTreeMap<RecordId, ModuleDecision>,
    student_information: BTreeMap<RecordId, StudentInformation>,
    modules: BTreeMap<String, Module>,
    last_user_id: i64,
    last_record_id: i64,
}

impl Tables {
    fn next_user_id(&mut self) -> UserId {
        self.last_user_id += 1;
        UserId::new(self.last_user_id)
    }

    fn next_record_id(&mut self) -> RecordId {
        self.last_record_id += 1;
        RecordId::new(self.last_record_id)
    }

    fn live_application(&self, id: RecordId) -> Option<&EcApplication> {
        if self.withdrawn.contains(&id) {
            return None;
        }
        self.applications.get(&id)
    }

    fn resolve_role(&self, role_id: RoleId) -> Option<Role> {
        self.roles.get(&role_id).and_then(|info| Role::parse(&info.name))
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory implementation of the persistence collaborators.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    available: AtomicBool,
    verifier: Arc<dyn HashVerifier>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            available: AtomicBool::new(true),
            verifier: Arc::new(Argon2Verifier),
        }
    }

    /// Replaces the password verifier used by
    /// [`CredentialStore::verify_credentials`].
    pub fn with_verifier(mut self, verifier: Arc<dyn HashVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Creates a store seeded with the three standard role rows:
    /// 1 Administrator, 2 Academic_Staff, 3 Student.
    pub fn with_default_roles() -> Self {
        let store = Self::new();
        for (index, role) in Role::ALL.iter().enumerate() {
            store.insert_role(RoleInfo {
                id: RoleId::new(index as i64 + 1),
                name: role.as_str().to_string(),
            });
        }
        store
    }

    /// Switches the store between reachable and unreachable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns `true` if the store currently answers calls.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DependencyError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(DependencyError::new(COMPONENT, "store is offline"))
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Inserts or replaces a role row.
    pub fn insert_role(&self, role: RoleInfo) {
        self.tables.write().roles.insert(role.id, role);
    }

    /// Inserts or replaces a department row.
    pub fn insert_department(&self, department: Department) {
        self.tables.write().departments.insert(department.id, department);
    }

    /// Inserts a user with a fixed id, bypassing registration checks except
    /// role resolution.
    pub fn insert_user(&self, id: UserId, user: NewUser) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write();
        let role = tables
            .resolve_role(user.role_id)
            .ok_or(StoreError::UnknownRole(user.role_id))?;
        let record = UserRecord {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_approved: user.is_approved,
            role_id: user.role_id,
            role,
            department_id: user.department_id,
        };
        tables.last_user_id = tables.last_user_id.max(id.get());
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    /// Inserts an application with a fixed id.
    pub fn insert_application(&self, application: EcApplication) {
        let mut tables = self.tables.write();
        tables.last_record_id = tables.last_record_id.max(application.id.get());
        tables.applications.insert(application.id, application);
    }

    /// Inserts an evidence record with a fixed id.
    pub fn insert_evidence(&self, evidence: Evidence) {
        let mut tables = self.tables.write();
        tables.last_record_id = tables.last_record_id.max(evidence.id.get());
        tables.evidence.insert(evidence.id, evidence);
    }

    /// Inserts a module request with a fixed id.
    pub fn insert_module_request(&self, request: ModuleRequest) {
        let mut tables = self.tables.write();
        tables.last_record_id = tables.last_record_id.max(request.id.get());
        tables.module_requests.insert(request.id, request);
    }

    /// Inserts a module decision with a fixed id.
    pub fn insert_module_decision(&self, decision: ModuleDecision) {
        let mut tables = self.tables.write();
        tables.last_record_id = tables.last_record_id.max(decision.id.get());
        tables.module_decisions.insert(decision.id, decision);
    }

    /// Inserts student information with a fixed id.
    pub fn insert_student_information(&self, info: StudentInformation) {
        let mut tables = self.tables.write();
        tables.last_record_id = tables.last_record_id.max(info.id.get());
        tables.student_information.insert(info.id, info);
    }

    /// Inserts or replaces a module.
    pub fn insert_module(&self, module: Module) {
        self.tables.write().modules.insert(module.code.clone(), module);
    }

    /// Soft-deletes an application. Its nested records stay but no longer
    /// resolve to an owner.
    pub fn withdraw_application(&self, id: RecordId) -> bool {
        let mut tables = self.tables.write();
        tables.applications.contains_key(&id) && tables.withdrawn.insert(id)
    }

    /// Returns the number of stored users.
    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }
}

// =============================================================================
// CredentialStore
// =============================================================================

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, DependencyError> {
        self.check()?;
        if email.is_empty() || password.is_empty() {
            return Ok(None);
        }

        let candidate = {
            let tables = self.tables.read();
            tables.users.values().find(|u| u.email == email).cloned()
        };

        // One hash check per attempt, off the async workers and outside the lock.
        let verifier = Arc::clone(&self.verifier);
        let stored = candidate.as_ref().map(|user| user.password_hash.clone());
        let password = password.to_string();
        let matched = tokio::task::spawn_blocking(move || {
            verify_account(verifier.as_ref(), stored.as_deref(), &password)
        })
        .await
        .map_err(|e| DependencyError::new(COMPONENT, format!("password check failed: {}", e)))?;

        Ok(candidate.filter(|_| matched))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().users.get(&id).cloned())
    }
}

// =============================================================================
// UserDirectory
// =============================================================================

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        self.check()?;
        let mut tables = self.tables.write();

        let role = tables
            .resolve_role(user.role_id)
            .ok_or(StoreError::UnknownRole(user.role_id))?;
        if !tables.departments.contains_key(&user.department_id) {
            return Err(StoreError::UnknownDepartment(user.department_id));
        }
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        let id = tables.next_user_id();
        let record = UserRecord {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_approved: user.is_approved,
            role_id: user.role_id,
            role,
            department_id: user.department_id,
        };
        tables.users.insert(id, record.clone());
        debug!(user_id = %id, role = %role, "User created");
        Ok(record)
    }

    async fn list_roles(&self) -> Result<Vec<RoleInfo>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().roles.values().cloned().collect())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().departments.values().cloned().collect())
    }
}

// =============================================================================
// ResourceGateway
// =============================================================================

#[async_trait]
impl ResourceGateway for MemoryStore {
    async fn application_owner(&self, id: RecordId) -> Result<Option<UserId>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().live_application(id).map(|a| a.student_id))
    }

    async fn parent_application(
        &self,
        kind: ResourceKind,
        id: RecordId,
    ) -> Result<Option<RecordId>, DependencyError> {
        self.check()?;
        let tables = self.tables.read();
        let parent = match kind {
            ResourceKind::Evidence => tables.evidence.get(&id).and_then(|e| e.ec_application_id),
            ResourceKind::ModuleRequest => tables
                .module_requests
                .get(&id)
                .and_then(|r| r.ec_application_id),
            ResourceKind::ModuleDecision => tables
                .module_decisions
                .get(&id)
                .and_then(|d| d.ec_application_id),
            _ => None,
        };
        Ok(parent)
    }

    async fn student_information_owner(
        &self,
        id: RecordId,
    ) -> Result<Option<UserId>, DependencyError> {
        self.check()?;
        Ok(self
            .tables
            .read()
            .student_information
            .get(&id)
            .map(|info| info.student_id))
    }
}

// =============================================================================
// RecordStore
// =============================================================================

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_application(&self, new: NewEcApplication) -> StoreResult<EcApplication> {
        self.check()?;
        if new.circumstances_details.trim().is_empty() {
            return Err(StoreError::invalid(
                "circumstancesDetails",
                "must not be empty",
            ));
        }
        if let (Some(start), Some(end)) = (new.affected_date_start, new.affected_date_end) {
            if end < start {
                return Err(StoreError::invalid(
                    "affectedDateEnd",
                    "must not precede affectedDateStart",
                ));
            }
        }

        let mut tables = self.tables.write();
        if !tables.users.contains_key(&new.student_id) {
            return Err(StoreError::not_found("user", new.student_id));
        }

        let id = tables.next_record_id();
        let application = EcApplication {
            id,
            circumstances_details: new.circumstances_details,
            affected_date_start: new.affected_date_start,
            affected_date_end: new.affected_date_end,
            submitted_on: Utc::now().date_naive(),
            requires_further_evidence: false,
            is_referred: false,
            student_id: new.student_id,
        };
        tables.applications.insert(id, application.clone());
        Ok(application)
    }

    async fn get_application(
        &self,
        id: RecordId,
    ) -> Result<Option<EcApplication>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().live_application(id).cloned())
    }

    async fn update_application(
        &self,
        id: RecordId,
        patch: EcApplicationPatch,
    ) -> StoreResult<EcApplication> {
        self.check()?;
        let mut tables = self.tables.write();
        if tables.withdrawn.contains(&id) {
            return Err(StoreError::not_found("ec_application", id));
        }
        let application = tables
            .applications
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("ec_application", id))?;
        patch.apply(application);
        Ok(application.clone())
    }

    async fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<EcApplication>, DependencyError> {
        self.check()?;
        let tables = self.tables.read();
        let applications = tables
            .applications
            .values()
            .filter(|a| !tables.withdrawn.contains(&a.id))
            .filter(|a| match filter {
                ApplicationFilter::All => true,
                ApplicationFilter::Student(student_id) => a.student_id == student_id,
                ApplicationFilter::Department(department_id) => tables
                    .users
                    .get(&a.student_id)
                    .is_some_and(|u| u.department_id == department_id),
            })
            .cloned()
            .collect();
        Ok(applications)
    }

    async fn get_evidence(&self, id: RecordId) -> Result<Option<Evidence>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().evidence.get(&id).cloned())
    }

    async fn create_module_request(&self, new: NewModuleRequest) -> StoreResult<ModuleRequest> {
        self.check()?;
        let mut tables = self.tables.write();
        if tables.live_application(new.ec_application_id).is_none() {
            return Err(StoreError::not_found("ec_application", new.ec_application_id));
        }
        if !tables.modules.contains_key(&new.module_code) {
            return Err(StoreError::not_found("module", &new.module_code));
        }

        let id = tables.next_record_id();
        let request = ModuleRequest {
            id,
            requested_outcome: new.requested_outcome,
            related_assessment: new.related_assessment,
            module_code: new.module_code,
            ec_application_id: Some(new.ec_application_id),
        };
        tables.module_requests.insert(id, request.clone());
        Ok(request)
    }

    async fn get_module_request(
        &self,
        id: RecordId,
    ) -> Result<Option<ModuleRequest>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().module_requests.get(&id).cloned())
    }

    async fn create_module_decision(
        &self,
        new: NewModuleDecision,
    ) -> StoreResult<ModuleDecision> {
        self.check()?;
        let mut tables = self.tables.write();
        let ec_application_id = tables
            .module_requests
            .get(&new.module_request_id)
            .ok_or_else(|| StoreError::not_found("module_request", new.module_request_id))?
            .ec_application_id;

        let id = tables.next_record_id();
        let decision = ModuleDecision {
            id,
            comments: new.comments,
            is_approved: new.is_approved,
            module_request_id: new.module_request_id,
            staff_member_id: new.staff_member_id,
            ec_application_id,
        };
        tables.module_decisions.insert(id, decision.clone());
        Ok(decision)
    }

    async fn get_module_decision(
        &self,
        id: RecordId,
    ) -> Result<Option<ModuleDecision>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().module_decisions.get(&id).cloned())
    }

    async fn create_student_information(
        &self,
        new: NewStudentInformation,
    ) -> StoreResult<StudentInformation> {
        self.check()?;
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&new.student_id) {
            return Err(StoreError::not_found("user", new.student_id));
        }
        if tables
            .student_information
            .values()
            .any(|info| info.student_id == new.student_id)
        {
            return Err(StoreError::Duplicate {
                entity: "student_information",
                key: new.student_id.to_string(),
            });
        }

        let id = tables.next_record_id();
        let info = StudentInformation {
            id,
            has_health_issues: new.has_health_issues,
            has_disability: new.has_disability,
            has_lsp: new.has_lsp,
            additional_details: new.additional_details,
            student_id: new.student_id,
        };
        tables.student_information.insert(id, info.clone());
        Ok(info)
    }

    async fn get_student_information(
        &self,
        id: RecordId,
    ) -> Result<Option<StudentInformation>, DependencyError> {
        self.check()?;
        Ok(self.tables.read().student_information.get(&id).cloned())
    }

    async fn create_module(&self, module: Module) -> StoreResult<Module> {
        self.check()?;
        if module.code.trim().is_empty() {
            return Err(StoreError::invalid("code", "must not be empty"));
        }
        let mut tables = self.tables.write();
        if !tables.departments.contains_key(&module.department_id) {
            return Err(StoreError::UnknownDepartment(module.department_id));
        }
        if tables.modules.contains_key(&module.code) {
            return Err(StoreError::Duplicate {
                entity: "module",
                key: module.code,
            });
        }
        tables.modules.insert(module.code.clone(), module.clone());
        Ok(module)
    }

    async fn update_module(&self, code: &str, patch: ModulePatch) -> StoreResult<Module> {
        self.check()?;
        let mut tables = self.tables.write();
        if let Some(department_id) = patch.department_id {
            if !tables.departments.contains_key(&department_id) {
                return Err(StoreError::UnknownDepartment(department_id));
            }
        }
        let module = tables
            .modules
            .get_mut(code)
            .ok_or_else(|| StoreError::not_found("module", code))?;
        if let Some(name) = patch.name {
            module.name = name;
        }
        if let Some(department_id) = patch.department_id {
            module.department_id = department_id;
        }
        Ok(module.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::password::{Argon2Hasher, UNUSED_ACCOUNT_HASH};

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1, 1).unwrap()
    }

    fn new_user(email: &str, role_id: i64, department_id: i64) -> NewUser {
        NewUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: hasher().hash("password").unwrap(),
            role_id: RoleId::new(role_id),
            department_id: DepartmentId::new(department_id),
            is_approved: true,
        }
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::with_default_roles();
        store.insert_department(Department {
            id: DepartmentId::new(1),
            name: "Computer Science".into(),
        });
        store.insert_department(Department {
            id: DepartmentId::new(2),
            name: "History".into(),
        });
        store
    }

    fn application(id: i64, student: i64) -> EcApplication {
        EcApplication {
            id: RecordId::new(id),
            circumstances_details: "illness".into(),
            affected_date_start: None,
            affected_date_end: None,
            submitted_on: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            requires_further_evidence: false,
            is_referred: false,
            student_id: UserId::new(student),
        }
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let store = store();
        store
            .insert_user(UserId::new(7), new_user("s7@uni.ac.uk", 3, 1))
            .unwrap();

        let found = store.verify_credentials("s7@uni.ac.uk", "password").await.unwrap();
        assert_eq!(found.map(|u| u.role), Some(Role::Student));
        assert!(store
            .verify_credentials("s7@uni.ac.uk", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("nobody@uni.ac.uk", "password")
            .await
            .unwrap()
            .is_none());
        assert!(store.verify_credentials("", "").await.unwrap().is_none());
    }

    #[derive(Debug, Default)]
    struct CountingVerifier {
        checked: parking_lot::Mutex<Vec<String>>,
    }

    impl HashVerifier for CountingVerifier {
        fn verify(&self, hash: &str, password: &str) -> bool {
            self.checked.lock().push(hash.to_string());
            crate::password::verify_password(hash, password)
        }
    }

    #[tokio::test]
    async fn test_unknown_email_costs_one_hash_check() {
        let verifier = Arc::new(CountingVerifier::default());
        let store = store().with_verifier(verifier.clone());
        store
            .insert_user(UserId::new(7), new_user("s7@uni.ac.uk", 3, 1))
            .unwrap();

        assert!(store
            .verify_credentials("s7@uni.ac.uk", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("nobody@uni.ac.uk", "wrong")
            .await
            .unwrap()
            .is_none());

        let checked = verifier.checked.lock().clone();
        assert_eq!(checked.len(), 2);
        assert_ne!(checked[0], UNUSED_ACCOUNT_HASH);
        assert_eq!(checked[1], UNUSED_ACCOUNT_HASH);
    }

    #[tokio::test]
    async fn test_create_user_checks() {
        let store = store();
        let created = store.create_user(new_user("a@uni.ac.uk", 2, 1)).await.unwrap();
        assert_eq!(created.role, Role::AcademicStaff);

        assert!(matches!(
            store.create_user(new_user("b@uni.ac.uk", 9, 1)).await,
            Err(StoreError::UnknownRole(_))
        ));
        assert!(matches!(
            store.create_user(new_user("b@uni.ac.uk", 3, 9)).await,
            Err(StoreError::UnknownDepartment(_))
        ));
        assert!(matches!(
            store.create_user(new_user("A@uni.ac.uk", 3, 1)).await,
            Err(StoreError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_nested_ownership_resolution() {
        let store = store();
        store.insert_application(application(10, 7));
        store.insert_module_request(ModuleRequest {
            id: RecordId::new(20),
            requested_outcome: "deferral".into(),
            related_assessment: None,
            module_code: "COM1001".into(),
            ec_application_id: Some(RecordId::new(10)),
        });
        store.insert_evidence(Evidence {
            id: RecordId::new(30),
            file_name: "note.pdf".into(),
            ec_application_id: None,
        });

        let owner = store
            .owner_student_id(ResourceKind::ModuleRequest, RecordId::new(20))
            .await
            .unwrap();
        assert_eq!(owner, Some(UserId::new(7)));

        let orphan = store
            .owner_student_id(ResourceKind::Evidence, RecordId::new(30))
            .await
            .unwrap();
        assert_eq!(orphan, None);
    }

    #[tokio::test]
    async fn test_withdrawn_application_has_no_owner() {
        let store = store();
        store.insert_application(application(10, 7));
        assert!(store.withdraw_application(RecordId::new(10)));

        let owner = store.application_owner(RecordId::new(10)).await.unwrap();
        assert_eq!(owner, None);
        assert!(store.get_application(RecordId::new(10)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_applications_by_department() {
        let store = store();
        store.insert_user(UserId::new(7), new_user("s7@uni.ac.uk", 3, 1)).unwrap();
        store.insert_user(UserId::new(8), new_user("s8@uni.ac.uk", 3, 2)).unwrap();
        store.insert_application(application(10, 7));
        store.insert_application(application(11, 8));

        let cs = store
            .list_applications(ApplicationFilter::Department(DepartmentId::new(1)))
            .await
            .unwrap();
        assert_eq!(cs.len(), 1);
        assert_eq!(cs[0].student_id, UserId::new(7));

        let all = store.list_applications(ApplicationFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_record_ids_continue_after_seeded_rows() {
        let store = store();
        store.insert_user(UserId::new(7), new_user("s7@uni.ac.uk", 3, 1)).unwrap();
        store.insert_application(application(10, 7));

        let created = store
            .create_application(NewEcApplication {
                student_id: UserId::new(7),
                circumstances_details: "bereavement".into(),
                affected_date_start: None,
                affected_date_end: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, RecordId::new(11));
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = store();
        store.set_available(false);

        assert!(store.find_by_id(UserId::new(1)).await.is_err());
        assert!(store.application_owner(RecordId::new(1)).await.is_err());
        assert!(matches!(
            store.create_user(new_user("x@uni.ac.uk", 3, 1)).await,
            Err(StoreError::Dependency(_))
        ));

        store.set_available(true);
        assert!(store.find_by_id(UserId::new(1)).await.unwrap().is_none());
    }
}
