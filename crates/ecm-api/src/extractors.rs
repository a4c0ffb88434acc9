// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequest, FromRequestParts, Path},
    http::{request::Parts, Request},
    body::Body,
    Json,
};
use ecm_core::RecordId;
use serde::de::DeserializeOwned;

use crate::auth::{AuthContext, Caller};
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Reads the [`AuthContext`] left by the auth middleware. Returns 401 if the
/// request carries no verified identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(caller): Auth) -> impl IntoResponse {
///     format!("Hello, {}", caller.identity.email)
/// }
/// ```
pub struct Auth(pub Caller);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .and_then(AuthContext::into_caller)
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Malformed bodies become a 400 with the serde message instead of axum's
/// plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Record ID Extractor
// =============================================================================

/// Extractor for a numeric record id in the path.
pub struct RecordIdPath(pub RecordId);

impl<S> FromRequestParts<S> for RecordIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid record id: {}", e.body_text())))?;

        Ok(RecordIdPath(RecordId::new(id)))
    }
}

// =============================================================================
// Request Context Extractors
// =============================================================================

/// Extractor for the request ID.
pub struct RequestId(pub uuid::Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| ctx.request_id)
            .unwrap_or_else(uuid::Uuid::now_v7);

        Ok(RequestId(id))
    }
}

/// Extractor for the client IP address.
///
/// Prefers `X-Forwarded-For`, then `X-Real-IP`, then the socket address
/// recorded by the auth middleware.
pub struct ClientIp(pub Option<std::net::IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = forwarded {
            return Ok(ClientIp(Some(ip)));
        }

        let real_ip = parts
            .headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = real_ip {
            return Ok(ClientIp(Some(ip)));
        }

        let from_ctx = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.client_ip);

        Ok(ClientIp(from_ctx))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ecm_core::{DepartmentId, Identity, Role, UserId};

    fn parts(ctx: Option<AuthContext>, forwarded: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/x");
        if let Some(value) = forwarded {
            builder = builder.header("X-Forwarded-For", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        if let Some(ctx) = ctx {
            parts.extensions.insert(ctx);
        }
        parts
    }

    #[tokio::test]
    async fn test_auth_rejects_anonymous() {
        let mut p = parts(Some(AuthContext::anonymous()), None);
        assert!(Auth::from_request_parts(&mut p, &()).await.is_err());

        let mut p = parts(None, None);
        assert!(Auth::from_request_parts(&mut p, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_auth_yields_caller() {
        let identity = Identity::new(
            UserId::new(7),
            "s7@uni.test",
            Role::Student,
            DepartmentId::new(1),
        );
        let mut p = parts(Some(AuthContext::authenticated(identity)), None);

        let Auth(caller) = Auth::from_request_parts(&mut p, &()).await.ok().unwrap();
        assert_eq!(caller.user_id(), UserId::new(7));
    }

    #[tokio::test]
    async fn test_client_ip_prefers_forwarded_header() {
        let ctx = AuthContext::anonymous().with_client_ip("10.0.0.9".parse().ok());
        let mut p = parts(Some(ctx), Some("192.0.2.1, 10.0.0.1"));

        let ClientIp(ip) = ClientIp::from_request_parts(&mut p, &()).await.unwrap();
        assert_eq!(ip, Some("192.0.2.1".parse().unwrap()));
    }
}
