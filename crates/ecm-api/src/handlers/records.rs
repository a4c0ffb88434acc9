// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Handlers for records nested under an EC application, plus student
//! information.

use axum::{extract::State, response::IntoResponse, Json};
use ecm_core::{
    Action, NewModuleDecision, NewModuleRequest, NewStudentInformation, RecordId, ResourceKind,
};
use serde::Deserialize;

use crate::auth::ResourceRef;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, RecordIdPath, ValidatedJson};
use crate::response::Created;
use crate::state::AppState;

// =============================================================================
// Evidence
// =============================================================================

/// GET /evidence/{id}
pub async fn get_evidence(
    State(state): State<AppState>,
    Auth(caller): Auth,
    RecordIdPath(id): RecordIdPath,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Read,
            ResourceRef::instance(ResourceKind::Evidence, id),
        )
        .await?;

    let evidence = state
        .records
        .get_evidence(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Evidence {}", id)))?;

    Ok(Json(evidence))
}

// =============================================================================
// Module Requests
// =============================================================================

/// GET /module-requests/{id}
pub async fn get_module_request(
    State(state): State<AppState>,
    Auth(caller): Auth,
    RecordIdPath(id): RecordIdPath,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Read,
            ResourceRef::instance(ResourceKind::ModuleRequest, id),
        )
        .await?;

    let request = state
        .records
        .get_module_request(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Module request {}", id)))?;

    Ok(Json(request))
}

/// POST /module-requests
///
/// The caller must own the parent application unless they are staff.
pub async fn create_module_request(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ValidatedJson(request): ValidatedJson<NewModuleRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Create,
            ResourceRef::under(
                ResourceKind::ModuleRequest,
                ResourceKind::EcApplication,
                request.ec_application_id,
            ),
        )
        .await?;

    let created = state.records.create_module_request(request).await?;
    Ok(Created(created))
}

// =============================================================================
// Module Decisions
// =============================================================================

/// Body of `POST /module-decisions`. The deciding staff member is the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleDecisionRequest {
    /// Reviewer comments.
    #[serde(default)]
    pub comments: Option<String>,
    /// Whether the request is approved.
    #[serde(default)]
    pub is_approved: bool,
    /// Request being decided.
    pub module_request_id: RecordId,
}

/// GET /module-decisions/{id}
pub async fn get_module_decision(
    State(state): State<AppState>,
    Auth(caller): Auth,
    RecordIdPath(id): RecordIdPath,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Read,
            ResourceRef::instance(ResourceKind::ModuleDecision, id),
        )
        .await?;

    let decision = state
        .records
        .get_module_decision(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Module decision {}", id)))?;

    Ok(Json(decision))
}

/// POST /module-decisions
pub async fn create_module_decision(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ValidatedJson(request): ValidatedJson<CreateModuleDecisionRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Create,
            ResourceRef::under(
                ResourceKind::ModuleDecision,
                ResourceKind::ModuleRequest,
                request.module_request_id,
            ),
        )
        .await?;

    let decision = state
        .records
        .create_module_decision(NewModuleDecision {
            comments: request.comments,
            is_approved: request.is_approved,
            module_request_id: request.module_request_id,
            staff_member_id: caller.user_id(),
        })
        .await?;

    tracing::info!(
        decision_id = %decision.id,
        module_request_id = %decision.module_request_id,
        approved = decision.is_approved,
        "Module decision recorded"
    );

    Ok(Created(decision))
}

// =============================================================================
// Student Information
// =============================================================================

/// GET /student-information/{id}
pub async fn get_student_information(
    State(state): State<AppState>,
    Auth(caller): Auth,
    RecordIdPath(id): RecordIdPath,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Read,
            ResourceRef::instance(ResourceKind::StudentInformation, id),
        )
        .await?;

    let info = state
        .records
        .get_student_information(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Student information {}", id)))?;

    Ok(Json(info))
}

/// POST /student-information
pub async fn create_student_information(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ValidatedJson(request): ValidatedJson<NewStudentInformation>,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Create,
            ResourceRef::student(ResourceKind::StudentInformation, request.student_id),
        )
        .await?;

    let info = state.records.create_student_information(request).await?;
    Ok(Created(info))
}
