// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit entry types.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resource::{Action, ResourceKind};
use crate::types::{RecordId, UserId};

// =============================================================================
// AuditLog
// =============================================================================

/// A single audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Entry id.
    pub id: Uuid,

    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Severity of the event.
    pub severity: AuditSeverity,

    /// Acting user, or the attempted email for failed logins.
    pub user_id: Option<String>,

    /// Client address.
    pub client_ip: Option<IpAddr>,

    /// What was attempted.
    pub action: AuditAction,

    /// What it was attempted on.
    pub resource: AuditResource,

    /// Free-form details.
    pub details: serde_json::Value,

    /// Outcome.
    pub result: ActionResult,

    /// Request id for correlation with traces.
    pub correlation_id: Option<Uuid>,
}

impl AuditLog {
    /// Creates a new entry.
    pub fn new(action: AuditAction, resource: AuditResource, result: ActionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            severity: action.default_severity(),
            user_id: None,
            client_ip: None,
            action,
            resource,
            details: serde_json::Value::Null,
            result,
            correlation_id: None,
        }
    }

    /// Sets the acting user.
    pub fn with_user(mut self, user_id: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        self.user_id = Some(user_id.into());
        self.client_ip = client_ip;
        self
    }

    /// Sets the details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Sets the correlation id.
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// A successful login.
    pub fn login(user_id: UserId, client_ip: Option<IpAddr>) -> Self {
        Self::new(
            AuditAction::Login,
            AuditResource::user(user_id),
            ActionResult::Success,
        )
        .with_user(user_id.to_string(), client_ip)
    }

    /// A rejected login. The attempted email is recorded, never the password.
    pub fn login_failed(email: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        let email = email.into();
        Self::new(
            AuditAction::LoginFailed,
            AuditResource::new("user", &email),
            ActionResult::failure("Invalid credentials"),
        )
        .with_user(email, client_ip)
    }

    /// A new account.
    pub fn register(user_id: UserId, client_ip: Option<IpAddr>) -> Self {
        Self::new(
            AuditAction::Register,
            AuditResource::user(user_id),
            ActionResult::Success,
        )
        .with_user(user_id.to_string(), client_ip)
    }

    /// An authorization denial.
    pub fn access_denied(
        action: Action,
        resource: AuditResource,
        user_id: UserId,
        client_ip: Option<IpAddr>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(AuditAction::AccessDenied, resource, ActionResult::Denied)
            .with_user(user_id.to_string(), client_ip)
            .with_details(serde_json::json!({
                "action": action.as_str(),
                "reason": reason.into(),
            }))
    }
}

// =============================================================================
// AuditSeverity
// =============================================================================

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Normal operation.
    #[default]
    Info,
    /// Significant but expected, e.g. a new account.
    Notice,
    /// Potentially hostile, e.g. a denial.
    Warning,
}

impl AuditSeverity {
    /// Returns the severity as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "info",
            AuditSeverity::Notice => "notice",
            AuditSeverity::Warning => "warning",
        }
    }

    /// Numeric level, higher is more severe.
    pub fn level(&self) -> u8 {
        match self {
            AuditSeverity::Info => 1,
            AuditSeverity::Notice => 2,
            AuditSeverity::Warning => 3,
        }
    }
}

impl fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// AuditAction
// =============================================================================

/// Auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Successful login.
    Login,
    /// Rejected login.
    LoginFailed,
    /// Account registration.
    Register,
    /// Authorization denial.
    AccessDenied,
}

impl AuditAction {
    /// Returns the action as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::Register => "register",
            AuditAction::AccessDenied => "access_denied",
        }
    }

    /// Returns the default severity for this action.
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditAction::Login => AuditSeverity::Info,
            AuditAction::Register => AuditSeverity::Notice,
            AuditAction::LoginFailed | AuditAction::AccessDenied => AuditSeverity::Warning,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// AuditResource
// =============================================================================

/// The target of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResource {
    /// Resource type, e.g. `ec_application`.
    pub resource_type: String,
    /// Resource id, or `*` for collections.
    pub resource_id: String,
}

impl AuditResource {
    /// Creates a resource reference.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// A user account.
    pub fn user(user_id: UserId) -> Self {
        Self::new(ResourceKind::User.as_str(), user_id.to_string())
    }

    /// A single record.
    pub fn record(kind: ResourceKind, id: RecordId) -> Self {
        Self::new(kind.as_str(), id.to_string())
    }

    /// A whole collection of a kind.
    pub fn collection(kind: ResourceKind) -> Self {
        Self::new(kind.as_str(), "*")
    }

    /// Returns `type/id`.
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.resource_type, self.resource_id)
    }
}

// =============================================================================
// ActionResult
// =============================================================================

/// Outcome of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ActionResult {
    /// Completed.
    Success,
    /// Failed.
    Failure {
        /// Reason for failure.
        reason: String,
    },
    /// Rejected by authorization.
    Denied,
}

impl ActionResult {
    /// Creates a failure result.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Returns `true` on success.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }

    /// Returns `true` if denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, ActionResult::Denied)
    }

    /// Returns `true` on failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionResult::Failure { .. })
    }

    /// Returns the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionResult::Success => "success",
            ActionResult::Failure { .. } => "failure",
            ActionResult::Denied => "denied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failed_records_email_not_password() {
        let log = AuditLog::login_failed("ada@uni.ac.uk", None);
        assert_eq!(log.action, AuditAction::LoginFailed);
        assert_eq!(log.severity, AuditSeverity::Warning);
        assert_eq!(log.user_id.as_deref(), Some("ada@uni.ac.uk"));
        assert!(log.result.is_failure());
    }

    #[test]
    fn test_access_denied_details() {
        let log = AuditLog::access_denied(
            Action::Update,
            AuditResource::record(ResourceKind::EcApplication, RecordId::new(4)),
            UserId::new(8),
            None,
            "forbidden",
        );
        assert!(log.result.is_denied());
        assert_eq!(log.resource.full_path(), "ec_application/4");
        assert_eq!(log.details["action"], "update");
        assert_eq!(log.details["reason"], "forbidden");
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let json = serde_json::to_value(ActionResult::failure("bad")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "bad");
    }
}
