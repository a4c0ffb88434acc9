// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AuthContext, Authenticator};
use crate::error::ApiError;

/// Paths reachable without a token.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/auth/login",
    "/auth/register",
    "/roles",
    "/departments",
];

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer that identifies the caller from the `Authorization: Bearer` header.
///
/// Protected paths without a valid token are answered with 401 before the
/// handler runs. Every request, public or not, leaves with an
/// [`AuthContext`] in its extensions.
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<Authenticator>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer with no public paths.
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self {
            authenticator,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Replaces the public paths. A trailing `*` matches any suffix.
    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths = Arc::new(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Uses [`DEFAULT_PUBLIC_PATHS`].
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(DEFAULT_PUBLIC_PATHS.iter().copied())
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authenticator: self.authenticator.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware produced by [`AuthLayer`].
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public| {
            public
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let authenticator = self.authenticator.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            if is_public {
                let ctx = AuthContext::anonymous()
                    .with_request_id(request_id)
                    .with_client_ip(client_ip);
                req.extensions_mut().insert(ctx);
                return inner.call(req).await;
            }

            let Some(token) = extract_bearer_token(&req) else {
                tracing::debug!(path = %req.uri().path(), "No bearer token provided");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            let identity = match authenticator.identify(&token) {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::debug!(error = %e, path = %req.uri().path(), "Token rejected");
                    return Ok(ApiError::from(e).into_response());
                }
            };

            let ctx = AuthContext::authenticated(identity)
                .with_request_id(request_id)
                .with_client_ip(client_ip);
            req.extensions_mut().insert(ctx);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{FixedClock, TokenKeys, TokenService};
    use axum::http::{HeaderValue, StatusCode};
    use ecm_config::TokenAlgorithm;
    use ecm_core::MemoryStore;
    use tower::ServiceExt;

    fn authenticator() -> Arc<Authenticator> {
        let keys = TokenKeys::from_pem(
            TokenAlgorithm::RS256,
            include_bytes!("../../testdata/rsa_private.pem"),
            include_bytes!("../../testdata/rsa_public.pem"),
        )
        .unwrap();
        let tokens = TokenService::new(keys).with_clock(Arc::new(FixedClock::new(1_700_000_000)));
        Arc::new(Authenticator::new(Arc::new(MemoryStore::new()), tokens))
    }

    async fn echo(req: Request<Body>) -> Result<Response, std::convert::Infallible> {
        let anonymous = req
            .extensions()
            .get::<AuthContext>()
            .map(|ctx| ctx.is_anonymous())
            .unwrap_or(true);
        Ok(if anonymous { "anonymous" } else { "identified" }.into_response())
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = Request::builder().uri("/x").body(Body::empty()).unwrap();
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer_token(&req), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_public_paths() {
        let middleware = AuthLayer::new(authenticator())
            .with_public_paths(["/health", "/docs/*"])
            .layer(tower::service_fn(echo));

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/docs/index.html"));
        assert!(!middleware.is_public_path("/ec-applications"));
    }

    #[tokio::test]
    async fn test_protected_path_requires_token() {
        let service = AuthLayer::new(authenticator())
            .with_default_public_paths()
            .layer(tower::service_fn(echo));

        let req = Request::builder()
            .uri("/auth/me")
            .body(Body::empty())
            .unwrap();
        let response = service.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .uri("/auth/me")
            .header(header::AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        let response = service.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = service.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
