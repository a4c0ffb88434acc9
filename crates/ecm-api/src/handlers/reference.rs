// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Reference data handlers: roles, departments, and modules.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use ecm_core::{Action, Module, ModulePatch, ResourceKind};

use crate::auth::ResourceRef;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ValidatedJson};
use crate::response::Created;
use crate::state::AppState;

/// GET /roles
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let mut roles = state.users.list_roles().await?;
    roles.sort_by_key(|role| role.id);
    Ok(Json(roles))
}

/// GET /departments
pub async fn list_departments(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let mut departments = state.users.list_departments().await?;
    departments.sort_by_key(|department| department.id);
    Ok(Json(departments))
}

/// POST /modules
pub async fn create_module(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ValidatedJson(module): ValidatedJson<Module>,
) -> ApiResult<impl IntoResponse> {
    if module.code.trim().is_empty() {
        return Err(ApiError::validation("code is required"));
    }

    state
        .authorize(
            &caller,
            Action::Create,
            ResourceRef::keyed(ResourceKind::Module, &module.code),
        )
        .await?;

    let module = state.records.create_module(module).await?;
    tracing::info!(code = %module.code, "Module created");
    Ok(Created(module))
}

/// PATCH /modules/{code}
pub async fn update_module(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(code): Path<String>,
    ValidatedJson(patch): ValidatedJson<ModulePatch>,
) -> ApiResult<impl IntoResponse> {
    state
        .authorize(
            &caller,
            Action::Update,
            ResourceRef::keyed(ResourceKind::Module, &code),
        )
        .await?;

    let module = state.records.update_module(&code, patch).await?;
    Ok(Json(module))
}
