// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, response::IntoResponse, Json};
use ecm_core::{AuditLog, DepartmentId, NewUser, RoleId};
use serde::Deserialize;

use crate::auth::LoginOutcome;
use crate::error::{ApiError, ApiResult, ValidationErrors};
use crate::extractors::{Auth, ClientIp, RequestId, ValidatedJson};
use crate::response::{Created, LoginResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
///
/// Missing fields deserialize as empty so that they fail like any other bad
/// credential.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// POST /auth/login
///
/// Verifies credentials and returns a session token.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    RequestId(request_id): RequestId,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    match state.auth().login(&request.email, &request.password).await? {
        LoginOutcome::Success {
            identity,
            token,
            profile,
        } => {
            state
                .record_audit(
                    AuditLog::login(identity.user_id, client_ip).with_correlation_id(request_id),
                )
                .await;

            Ok(Json(LoginResponse::bearer(
                profile,
                token,
                state.tokens().lifetime_secs(),
            )))
        }
        LoginOutcome::Failure(reason) => {
            tracing::info!(reason = reason.as_str(), "Login rejected");
            state
                .record_audit(
                    AuditLog::login_failed(request.email.trim(), client_ip)
                        .with_correlation_id(request_id),
                )
                .await;

            Err(reason.into_error().into())
        }
    }
}

// =============================================================================
// Register
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Plain-text password; hashed before storage.
    #[serde(default)]
    pub password: String,
    /// Role row id.
    pub role_id: Option<i64>,
    /// Department id.
    pub department_id: Option<i64>,
    /// Whether the account starts approved.
    #[serde(default)]
    pub is_approved: bool,
}

impl RegisterRequest {
    fn validate(&self) -> ApiResult<(RoleId, DepartmentId)> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require("email", &self.email);
        errors.require("password", &self.password);
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            errors.add("email", "must be an email address");
        }
        if self.role_id.is_none() {
            errors.add("roleId", "is required");
        }
        if self.department_id.is_none() {
            errors.add("departmentId", "is required");
        }

        match (self.role_id, self.department_id) {
            (Some(role), Some(department)) if errors.is_empty() => {
                Ok((RoleId::new(role), DepartmentId::new(department)))
            }
            _ => Err(ApiError::validation_with_errors("Invalid registration", errors)),
        }
    }
}

/// POST /auth/register
///
/// Creates an account and returns its public profile.
pub async fn register(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    RequestId(request_id): RequestId,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (role_id, department_id) = request.validate()?;

    let hasher = state.hasher.clone();
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let user = state
        .users
        .create_user(NewUser {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
            role_id,
            department_id,
            is_approved: request.is_approved,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    state
        .record_audit(AuditLog::register(user.id, client_ip).with_correlation_id(request_id))
        .await;

    Ok(Created(user.profile()))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /auth/me
///
/// Returns the profile of the caller.
pub async fn current_user(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<impl IntoResponse> {
    let profile = state.auth().current_profile(&caller.identity).await?;
    Ok(Json(profile))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> RegisterRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_register_validation() {
        let ok = request(serde_json::json!({
            "name": "Ada",
            "email": "ada@uni.test",
            "password": "pw",
            "roleId": 3,
            "departmentId": 1
        }));
        assert_eq!(
            ok.validate().unwrap(),
            (RoleId::new(3), DepartmentId::new(1))
        );
        assert!(!ok.is_approved);

        let missing = request(serde_json::json!({ "email": "not-an-email" }));
        let Err(ApiError::Validation {
            errors: Some(errors),
            ..
        }) = missing.validate()
        else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.fields.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"roleId"));
    }
}
