// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access policy engine.
//!
//! Every authorization decision in the service goes through
//! [`AccessPolicy::authorize`], which applies two gates in order:
//!
//! 1. **Role gate**: a static table keyed by action and resource kind names
//!    the role(s) admitted. Administrators pass every requirement.
//! 2. **Ownership gate**: for records that belong to one student, callers
//!    whose role does not bypass ownership must be that student. The owner is
//!    resolved through the [`ResourceGateway`], walking nested records up to
//!    their EC application first.
//!
//! The role gate always runs first, so a student probing an admin-only
//! route learns nothing about whether the target exists.

use std::fmt;
use std::sync::Arc;

use ecm_core::{
    Action, AuditResource, DependencyError, DepartmentId, Identity, RecordId, ResourceGateway,
    ResourceKind, Role, UserId,
};

use super::error::{AuthError, AuthResult};

// =============================================================================
// ResourceRef
// =============================================================================

/// How a request addresses records of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One record by numeric id.
    Instance(RecordId),
    /// One record by natural key, e.g. a module code.
    Keyed(String),
    /// A new record to be created under an existing parent.
    Parent(ResourceKind, RecordId),
    /// Every record of the kind.
    Collection,
    /// Records belonging to one department.
    Department(DepartmentId),
    /// Records belonging to one student.
    Student(UserId),
}

/// A resource kind together with the records a request touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Addressed records.
    pub scope: Scope,
}

impl ResourceRef {
    /// One record by id.
    pub fn instance(kind: ResourceKind, id: RecordId) -> Self {
        Self {
            kind,
            scope: Scope::Instance(id),
        }
    }

    /// One record by natural key.
    pub fn keyed(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Scope::Keyed(key.into()),
        }
    }

    /// A new record under `parent`.
    pub fn under(kind: ResourceKind, parent: ResourceKind, parent_id: RecordId) -> Self {
        Self {
            kind,
            scope: Scope::Parent(parent, parent_id),
        }
    }

    /// Every record of a kind.
    pub fn collection(kind: ResourceKind) -> Self {
        Self {
            kind,
            scope: Scope::Collection,
        }
    }

    /// Records of one department.
    pub fn department(kind: ResourceKind, department_id: DepartmentId) -> Self {
        Self {
            kind,
            scope: Scope::Department(department_id),
        }
    }

    /// Records of one student.
    pub fn student(kind: ResourceKind, student_id: UserId) -> Self {
        Self {
            kind,
            scope: Scope::Student(student_id),
        }
    }

    /// Returns `true` if the reference spans many records.
    pub fn is_bulk(&self) -> bool {
        matches!(self.scope, Scope::Collection | Scope::Department(_))
    }

    /// Converts to an audit resource.
    pub fn to_audit_resource(&self) -> AuditResource {
        match &self.scope {
            Scope::Instance(id) => AuditResource::record(self.kind, *id),
            Scope::Keyed(key) => AuditResource::new(self.kind.as_str(), key),
            Scope::Parent(parent, id) => {
                AuditResource::new(self.kind.as_str(), format!("{}:{}", parent, id))
            }
            Scope::Collection => AuditResource::collection(self.kind),
            Scope::Department(id) => {
                AuditResource::new(self.kind.as_str(), format!("department:{}", id))
            }
            Scope::Student(id) => AuditResource::new(self.kind.as_str(), format!("student:{}", id)),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_audit_resource().full_path())
    }
}

// =============================================================================
// Role Gate
// =============================================================================

/// Roles admitted by the role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated identity.
    Any,
    /// Exactly this role (administrators always pass).
    Exactly(Role),
    /// Administrator or academic staff.
    Staff,
}

impl RoleRequirement {
    /// Returns `true` if `role` passes this requirement.
    pub fn admits(&self, role: Role) -> bool {
        if role.overrides_role_gate() {
            return true;
        }
        match self {
            RoleRequirement::Any => true,
            RoleRequirement::Exactly(required) => *required == role,
            RoleRequirement::Staff => role.is_staff(),
        }
    }
}

/// Looks up the role requirement for an action on a resource.
pub fn required_role(action: Action, resource: &ResourceRef) -> RoleRequirement {
    match (action, resource.kind) {
        (Action::Delete, _) => RoleRequirement::Exactly(Role::Administrator),
        (Action::Create | Action::Update, ResourceKind::Module | ResourceKind::Department) => {
            RoleRequirement::Exactly(Role::Administrator)
        }
        (Action::Create, ResourceKind::Role) | (Action::Update, ResourceKind::User) => {
            RoleRequirement::Exactly(Role::Administrator)
        }
        (Action::Create | Action::Update, ResourceKind::ModuleDecision) => {
            RoleRequirement::Exactly(Role::AcademicStaff)
        }
        (_, kind) if kind.is_ownership_subject() && resource.is_bulk() => RoleRequirement::Staff,
        _ => RoleRequirement::Any,
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The role gate refused.
    InsufficientRole,
    /// The caller is not the owner.
    Forbidden,
    /// The record or its ownership chain does not exist.
    NotFound,
}

impl DenyReason {
    /// Returns the reason as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::InsufficientRole => "insufficient_role",
            DenyReason::Forbidden => "forbidden",
            DenyReason::NotFound => "not_found",
        }
    }

    /// Converts to the matching auth error.
    pub fn into_error(self) -> AuthError {
        match self {
            DenyReason::InsufficientRole => AuthError::InsufficientRole,
            DenyReason::Forbidden => AuthError::Forbidden,
            DenyReason::NotFound => AuthError::NotFound,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Access granted.
    Allow,
    /// Access refused.
    Deny(DenyReason),
}

impl Decision {
    /// Returns `true` if access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

// =============================================================================
// AccessPolicy
// =============================================================================

/// The consolidated access policy.
#[derive(Clone)]
pub struct AccessPolicy {
    gateway: Arc<dyn ResourceGateway>,
}

impl AccessPolicy {
    /// Creates a policy resolving ownership through `gateway`.
    pub fn new(gateway: Arc<dyn ResourceGateway>) -> Self {
        Self { gateway }
    }

    /// Decides whether `identity` may perform `action` on `resource`.
    ///
    /// Gateway failures are returned as errors and never turned into a
    /// denial.
    pub async fn authorize(
        &self,
        identity: &Identity,
        action: Action,
        resource: &ResourceRef,
    ) -> Result<Decision, DependencyError> {
        if !required_role(action, resource).admits(identity.role) {
            return Ok(Decision::Deny(DenyReason::InsufficientRole));
        }

        if identity.role.bypasses_ownership() || !resource.kind.is_ownership_subject() {
            return Ok(Decision::Allow);
        }

        let owner = match &resource.scope {
            Scope::Instance(id) => self.gateway.owner_student_id(resource.kind, *id).await?,
            Scope::Parent(parent, id) => self.gateway.owner_student_id(*parent, *id).await?,
            Scope::Student(student_id) => Some(*student_id),
            // Bulk scopes are staff-only and keyed lookups never name an
            // ownership subject.
            Scope::Keyed(_) | Scope::Collection | Scope::Department(_) => None,
        };

        Ok(match owner {
            None => Decision::Deny(DenyReason::NotFound),
            Some(owner) if owner == identity.user_id => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::Forbidden),
        })
    }

    /// Like [`authorize`](Self::authorize), folding a denial into an error.
    pub async fn enforce(
        &self,
        identity: &Identity,
        action: Action,
        resource: &ResourceRef,
    ) -> AuthResult<()> {
        match self.authorize(identity, action, resource).await? {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason.into_error()),
        }
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessPolicy").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ecm_core::{EcApplication, Evidence, MemoryStore, ModuleDecision, ModuleRequest};

    fn who(id: i64, role: Role) -> Identity {
        Identity::new(
            UserId::new(id),
            format!("u{}@uni.test", id),
            role,
            DepartmentId::new(1),
        )
    }

    fn policy() -> (Arc<MemoryStore>, AccessPolicy) {
        let store = Arc::new(MemoryStore::with_default_roles());
        store.insert_application(EcApplication {
            id: RecordId::new(1),
            circumstances_details: "bereavement".into(),
            affected_date_start: None,
            affected_date_end: None,
            submitted_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            requires_further_evidence: false,
            is_referred: false,
            student_id: UserId::new(7),
        });
        store.insert_evidence(Evidence {
            id: RecordId::new(4),
            file_name: "note.pdf".into(),
            ec_application_id: Some(RecordId::new(1)),
        });
        store.insert_evidence(Evidence {
            id: RecordId::new(5),
            file_name: "orphan.pdf".into(),
            ec_application_id: None,
        });
        store.insert_module_request(ModuleRequest {
            id: RecordId::new(2),
            requested_outcome: "deferral".into(),
            related_assessment: None,
            module_code: "COM1001".into(),
            ec_application_id: Some(RecordId::new(1)),
        });
        store.insert_module_decision(ModuleDecision {
            id: RecordId::new(3),
            comments: None,
            is_approved: true,
            module_request_id: RecordId::new(2),
            staff_member_id: UserId::new(2),
            ec_application_id: Some(RecordId::new(1)),
        });
        (store.clone(), AccessPolicy::new(store))
    }

    #[test]
    fn test_role_table() {
        let module = ResourceRef::keyed(ResourceKind::Module, "COM1001");
        assert_eq!(
            required_role(Action::Create, &module),
            RoleRequirement::Exactly(Role::Administrator)
        );
        assert_eq!(required_role(Action::Read, &module), RoleRequirement::Any);

        let decision = ResourceRef::collection(ResourceKind::ModuleDecision);
        assert_eq!(
            required_role(Action::Create, &decision),
            RoleRequirement::Exactly(Role::AcademicStaff)
        );

        let by_department = ResourceRef::department(ResourceKind::EcApplication, DepartmentId::new(1));
        assert_eq!(
            required_role(Action::Read, &by_department),
            RoleRequirement::Staff
        );

        let evidence = ResourceRef::instance(ResourceKind::Evidence, RecordId::new(4));
        assert_eq!(
            required_role(Action::Delete, &evidence),
            RoleRequirement::Exactly(Role::Administrator)
        );
    }

    #[test]
    fn test_administrator_overrides_every_requirement() {
        for requirement in [
            RoleRequirement::Any,
            RoleRequirement::Staff,
            RoleRequirement::Exactly(Role::AcademicStaff),
            RoleRequirement::Exactly(Role::Student),
        ] {
            assert!(requirement.admits(Role::Administrator));
        }
        assert!(!RoleRequirement::Staff.admits(Role::Student));
        assert!(!RoleRequirement::Exactly(Role::AcademicStaff).admits(Role::Student));
    }

    #[tokio::test]
    async fn test_owner_allowed_other_student_forbidden() {
        let (_, policy) = policy();
        let application = ResourceRef::instance(ResourceKind::EcApplication, RecordId::new(1));

        let owner = policy
            .authorize(&who(7, Role::Student), Action::Read, &application)
            .await
            .unwrap();
        let other = policy
            .authorize(&who(8, Role::Student), Action::Read, &application)
            .await
            .unwrap();

        assert_eq!(owner, Decision::Allow);
        assert_eq!(other, Decision::Deny(DenyReason::Forbidden));
    }

    #[tokio::test]
    async fn test_nested_records_walk_to_application() {
        let (_, policy) = policy();

        for (kind, id) in [
            (ResourceKind::Evidence, 4),
            (ResourceKind::ModuleRequest, 2),
            (ResourceKind::ModuleDecision, 3),
        ] {
            let resource = ResourceRef::instance(kind, RecordId::new(id));
            let decision = policy
                .authorize(&who(8, Role::Student), Action::Read, &resource)
                .await
                .unwrap();
            assert_eq!(decision, Decision::Deny(DenyReason::Forbidden), "{}", kind);

            let decision = policy
                .authorize(&who(7, Role::Student), Action::Read, &resource)
                .await
                .unwrap();
            assert_eq!(decision, Decision::Allow, "{}", kind);
        }
    }

    #[tokio::test]
    async fn test_missing_chain_is_not_found() {
        let (store, policy) = policy();
        let student = who(7, Role::Student);

        let orphan = ResourceRef::instance(ResourceKind::Evidence, RecordId::new(5));
        let missing = ResourceRef::instance(ResourceKind::EcApplication, RecordId::new(99));
        for resource in [&orphan, &missing] {
            assert_eq!(
                policy.authorize(&student, Action::Read, resource).await.unwrap(),
                Decision::Deny(DenyReason::NotFound)
            );
        }

        store.withdraw_application(RecordId::new(1));
        let evidence = ResourceRef::instance(ResourceKind::Evidence, RecordId::new(4));
        assert_eq!(
            policy.authorize(&student, Action::Read, &evidence).await.unwrap(),
            Decision::Deny(DenyReason::NotFound)
        );
    }

    #[tokio::test]
    async fn test_role_gate_precedes_existence() {
        let (_, policy) = policy();
        let missing = ResourceRef::instance(ResourceKind::Evidence, RecordId::new(404));

        let decision = policy
            .authorize(&who(7, Role::Student), Action::Delete, &missing)
            .await
            .unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::InsufficientRole));
    }

    #[tokio::test]
    async fn test_staff_bypass_ownership() {
        let (_, policy) = policy();
        let application = ResourceRef::instance(ResourceKind::EcApplication, RecordId::new(1));

        for role in [Role::AcademicStaff, Role::Administrator] {
            let decision = policy
                .authorize(&who(2, role), Action::Update, &application)
                .await
                .unwrap();
            assert_eq!(decision, Decision::Allow);
        }
    }

    #[tokio::test]
    async fn test_create_under_parent() {
        let (_, policy) = policy();
        let request = ResourceRef::under(
            ResourceKind::ModuleRequest,
            ResourceKind::EcApplication,
            RecordId::new(1),
        );

        assert!(policy
            .enforce(&who(7, Role::Student), Action::Create, &request)
            .await
            .is_ok());
        assert!(matches!(
            policy
                .enforce(&who(8, Role::Student), Action::Create, &request)
                .await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_student_scope_compares_ids() {
        let (_, policy) = policy();
        let own = ResourceRef::student(ResourceKind::StudentInformation, UserId::new(7));
        let other = ResourceRef::student(ResourceKind::StudentInformation, UserId::new(8));
        let student = who(7, Role::Student);

        assert!(policy
            .authorize(&student, Action::Create, &own)
            .await
            .unwrap()
            .is_allowed());
        assert_eq!(
            policy.authorize(&student, Action::Create, &other).await.unwrap(),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_gateway_failure_is_not_a_denial() {
        let (store, policy) = policy();
        store.set_available(false);
        let application = ResourceRef::instance(ResourceKind::EcApplication, RecordId::new(1));

        let result = policy
            .authorize(&who(7, Role::Student), Action::Read, &application)
            .await;
        assert!(result.is_err());

        let result = policy
            .enforce(&who(7, Role::Student), Action::Read, &application)
            .await;
        assert!(matches!(result, Err(AuthError::DependencyUnavailable(_))));
    }
}
