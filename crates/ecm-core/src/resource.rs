// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Resource kinds, actions, and case records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{DepartmentId, RecordId, UserId};

// =============================================================================
// ResourceKind
// =============================================================================

/// Kinds of resource the access policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A student's extenuating-circumstances application.
    EcApplication,
    /// A file attached to an application.
    Evidence,
    /// Per-student background information.
    StudentInformation,
    /// A requested outcome for one module, under an application.
    ModuleRequest,
    /// A staff ruling on a module request.
    ModuleDecision,
    /// A taught module.
    Module,
    /// An academic department.
    Department,
    /// A role row.
    Role,
    /// A user account.
    User,
}

impl ResourceKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::EcApplication => "ec_application",
            ResourceKind::Evidence => "evidence",
            ResourceKind::StudentInformation => "student_information",
            ResourceKind::ModuleRequest => "module_request",
            ResourceKind::ModuleDecision => "module_decision",
            ResourceKind::Module => "module",
            ResourceKind::Department => "department",
            ResourceKind::Role => "role",
            ResourceKind::User => "user",
        }
    }

    /// Returns `true` if records of this kind belong to one student.
    pub fn is_ownership_subject(&self) -> bool {
        matches!(
            self,
            ResourceKind::EcApplication
                | ResourceKind::Evidence
                | ResourceKind::StudentInformation
                | ResourceKind::ModuleRequest
                | ResourceKind::ModuleDecision
        )
    }

    /// Returns `true` if records of this kind reach their owner through an
    /// EC application.
    pub fn is_nested_under_application(&self) -> bool {
        matches!(
            self,
            ResourceKind::Evidence | ResourceKind::ModuleRequest | ResourceKind::ModuleDecision
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Action
// =============================================================================

/// The verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// GET.
    Read,
    /// POST.
    Create,
    /// PATCH or PUT.
    Update,
    /// DELETE.
    Delete,
}

impl Action {
    /// Maps an HTTP method name to an action.
    pub fn from_method(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" | "HEAD" => Some(Action::Read),
            "POST" => Some(Action::Create),
            "PATCH" | "PUT" => Some(Action::Update),
            "DELETE" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Returns the action as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Returns `true` if the action mutates state.
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// EC Applications
// =============================================================================

/// An extenuating-circumstances application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcApplication {
    /// Primary key.
    pub id: RecordId,
    /// Free-text description of the circumstances.
    pub circumstances_details: String,
    /// First affected day.
    pub affected_date_start: Option<NaiveDate>,
    /// Last affected day.
    pub affected_date_end: Option<NaiveDate>,
    /// Submission date.
    pub submitted_on: NaiveDate,
    /// Staff asked for more evidence.
    pub requires_further_evidence: bool,
    /// Referred to a panel.
    pub is_referred: bool,
    /// Owning student.
    pub student_id: UserId,
}

/// Fields for a new application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEcApplication {
    /// Owning student.
    pub student_id: UserId,
    /// Free-text description of the circumstances.
    pub circumstances_details: String,
    /// First affected day.
    #[serde(default)]
    pub affected_date_start: Option<NaiveDate>,
    /// Last affected day.
    #[serde(default)]
    pub affected_date_end: Option<NaiveDate>,
}

/// Partial update of an application. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EcApplicationPatch {
    /// New description.
    pub circumstances_details: Option<String>,
    /// New first affected day.
    pub affected_date_start: Option<NaiveDate>,
    /// New last affected day.
    pub affected_date_end: Option<NaiveDate>,
    /// New further-evidence flag.
    pub requires_further_evidence: Option<bool>,
    /// New referral flag.
    pub is_referred: Option<bool>,
}

impl EcApplicationPatch {
    /// Applies the patch to an application.
    pub fn apply(self, application: &mut EcApplication) {
        if let Some(details) = self.circumstances_details {
            application.circumstances_details = details;
        }
        if let Some(start) = self.affected_date_start {
            application.affected_date_start = Some(start);
        }
        if let Some(end) = self.affected_date_end {
            application.affected_date_end = Some(end);
        }
        if let Some(flag) = self.requires_further_evidence {
            application.requires_further_evidence = flag;
        }
        if let Some(flag) = self.is_referred {
            application.is_referred = flag;
        }
    }
}

/// Selects a set of applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationFilter {
    /// Every application.
    All,
    /// Applications whose student belongs to a department.
    Department(DepartmentId),
    /// Applications of one student.
    Student(UserId),
}

// =============================================================================
// Nested Records
// =============================================================================

/// An uploaded evidence file.
///
/// The application reference is optional at the storage level; a missing
/// reference makes the record unreachable for ownership checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Primary key.
    pub id: RecordId,
    /// Stored file name.
    pub file_name: String,
    /// Parent application.
    pub ec_application_id: Option<RecordId>,
}

/// A requested outcome for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRequest {
    /// Primary key.
    pub id: RecordId,
    /// Outcome the student asks for.
    pub requested_outcome: String,
    /// Assessment the request relates to.
    pub related_assessment: Option<String>,
    /// Module code.
    pub module_code: String,
    /// Parent application.
    pub ec_application_id: Option<RecordId>,
}

/// Fields for a new module request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModuleRequest {
    /// Outcome the student asks for.
    pub requested_outcome: String,
    /// Assessment the request relates to.
    #[serde(default)]
    pub related_assessment: Option<String>,
    /// Module code.
    pub module_code: String,
    /// Parent application.
    pub ec_application_id: RecordId,
}

/// A staff ruling on a module request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDecision {
    /// Primary key.
    pub id: RecordId,
    /// Reviewer comments.
    pub comments: Option<String>,
    /// Whether the request was approved.
    pub is_approved: bool,
    /// Request being decided.
    pub module_request_id: RecordId,
    /// Deciding staff member.
    pub staff_member_id: UserId,
    /// Application the request belongs to.
    pub ec_application_id: Option<RecordId>,
}

/// Fields for a new module decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModuleDecision {
    /// Reviewer comments.
    #[serde(default)]
    pub comments: Option<String>,
    /// Whether the request was approved.
    pub is_approved: bool,
    /// Request being decided.
    pub module_request_id: RecordId,
    /// Deciding staff member.
    pub staff_member_id: UserId,
}

/// Background information a student shares with reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInformation {
    /// Primary key.
    pub id: RecordId,
    /// Declared health issues.
    pub has_health_issues: bool,
    /// Declared disability.
    pub has_disability: bool,
    /// Has a learning support plan.
    pub has_lsp: bool,
    /// Further details.
    pub additional_details: Option<String>,
    /// Owning student.
    pub student_id: UserId,
}

/// Fields for new student information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudentInformation {
    /// Declared health issues.
    #[serde(default)]
    pub has_health_issues: bool,
    /// Declared disability.
    #[serde(default)]
    pub has_disability: bool,
    /// Has a learning support plan.
    #[serde(default)]
    pub has_lsp: bool,
    /// Further details.
    #[serde(default)]
    pub additional_details: Option<String>,
    /// Owning student.
    pub student_id: UserId,
}

// =============================================================================
// Modules
// =============================================================================

/// A taught module, keyed by its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Module code, e.g. `COM3610`.
    pub code: String,
    /// Module title.
    pub name: String,
    /// Owning department.
    pub department_id: DepartmentId,
}

/// Partial update of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModulePatch {
    /// New title.
    pub name: Option<String>,
    /// New department.
    pub department_id: Option<DepartmentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_subjects() {
        assert!(ResourceKind::EcApplication.is_ownership_subject());
        assert!(ResourceKind::ModuleDecision.is_ownership_subject());
        assert!(!ResourceKind::Module.is_ownership_subject());
        assert!(!ResourceKind::Department.is_ownership_subject());
        assert!(ResourceKind::Evidence.is_nested_under_application());
        assert!(!ResourceKind::StudentInformation.is_nested_under_application());
    }

    #[test]
    fn test_action_from_method() {
        assert_eq!(Action::from_method("GET"), Some(Action::Read));
        assert_eq!(Action::from_method("post"), Some(Action::Create));
        assert_eq!(Action::from_method("PATCH"), Some(Action::Update));
        assert_eq!(Action::from_method("PUT"), Some(Action::Update));
        assert_eq!(Action::from_method("DELETE"), Some(Action::Delete));
        assert_eq!(Action::from_method("OPTIONS"), None);
    }

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut app = EcApplication {
            id: RecordId::new(1),
            circumstances_details: "flu".into(),
            affected_date_start: None,
            affected_date_end: None,
            submitted_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            requires_further_evidence: false,
            is_referred: false,
            student_id: UserId::new(7),
        };

        EcApplicationPatch {
            is_referred: Some(true),
            ..Default::default()
        }
        .apply(&mut app);

        assert!(app.is_referred);
        assert_eq!(app.circumstances_details, "flu");
        assert_eq!(app.student_id, UserId::new(7));
    }
}
