// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ecm_core::UserProfile;
use serde::{Deserialize, Serialize};

// =============================================================================
// Created
// =============================================================================

/// A `201 Created` response with a JSON body.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Public profile of the logged-in user.
    pub user: UserProfile,
    /// Session token.
    pub token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

impl LoginResponse {
    /// Creates a bearer token response.
    pub fn bearer(user: UserProfile, token: String, expires_in: i64) -> Self {
        Self {
            user,
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
