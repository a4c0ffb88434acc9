// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! EC application handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use ecm_core::{
    Action, ApplicationFilter, DepartmentId, EcApplicationPatch, NewEcApplication, ResourceKind,
    Role, UserId,
};
use serde::Deserialize;

use crate::auth::ResourceRef;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, RecordIdPath, ValidatedJson};
use crate::response::Created;
use crate::state::AppState;

const KIND: ResourceKind = ResourceKind::EcApplication;

// =============================================================================
// Create
// =============================================================================

/// Body of `POST /ec-applications`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    /// Owning student. Ignored for students, who always own what they create.
    pub student_id: Option<UserId>,
    /// Free-text description of the circumstances.
    #[serde(default)]
    pub circumstances_details: String,
    /// First affected day.
    pub affected_date_start: Option<NaiveDate>,
    /// Last affected day.
    pub affected_date_end: Option<NaiveDate>,
}

/// POST /ec-applications
pub async fn create_application(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ValidatedJson(request): ValidatedJson<CreateApplicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let student_id = match (caller.role(), request.student_id) {
        (Role::Student, _) => caller.user_id(),
        (_, Some(student_id)) => student_id,
        (_, None) => return Err(ApiError::validation("studentId is required")),
    };

    state
        .authorize(&caller, Action::Create, ResourceRef::student(KIND, student_id))
        .await?;

    let application = state
        .records
        .create_application(NewEcApplication {
            student_id,
            circumstances_details: request.circumstances_details,
            affected_date_start: request.affected_date_start,
            affected_date_end: request.affected_date_end,
        })
        .await?;

    tracing::info!(
        application_id = %application.id,
        student_id = %student_id,
        "EC application submitted"
    );

    Ok(Created(application))
}

// =============================================================================
// Read
// =============================================================================

/// Query of `GET /ec-applications`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsQuery {
    /// Restrict to one department. Staff only.
    pub department_id: Option<DepartmentId>,
}

/// GET /ec-applications
///
/// Staff see every application, or one department's with `departmentId`.
/// Students see their own.
pub async fn list_applications(
    State(state): State<AppState>,
    Auth(caller): Auth,
    query: Result<Query<ListApplicationsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let (resource, filter) = match query.department_id {
        Some(department_id) => (
            ResourceRef::department(KIND, department_id),
            ApplicationFilter::Department(department_id),
        ),
        None if caller.role().bypasses_ownership() => {
            (ResourceRef::collection(KIND), ApplicationFilter::All)
        }
        None => (
            ResourceRef::student(KIND, caller.user_id()),
            ApplicationFilter::Student(caller.user_id()),
        ),
    };

    state.authorize(&caller, Action::Read, resource).await?;

    let applications = state.records.list_applications(filter).await?;
    Ok(Json(applications))
}

/// GET /ec-applications/{id}
pub async fn get_application(
    State(state): State<AppState>,
    Auth(caller): Auth,
    RecordIdPath(id): RecordIdPath,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(&caller, Action::Read, ResourceRef::instance(KIND, id))
        .await?;

    let application = state
        .records
        .get_application(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("EC application {}", id)))?;

    Ok(Json(application))
}

// =============================================================================
// Update
// =============================================================================

/// PATCH /ec-applications/{id}
pub async fn update_application(
    State(state): State<AppState>,
    Auth(caller): Auth,
    RecordIdPath(id): RecordIdPath,
    ValidatedJson(patch): ValidatedJson<EcApplicationPatch>,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(&caller, Action::Update, ResourceRef::instance(KIND, id))
        .await?;

    let application = state.records.update_application(id, patch).await?;

    tracing::info!(application_id = %id, user_id = %caller.user_id(), "EC application updated");

    Ok(Json(application))
}
