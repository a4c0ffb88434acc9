// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Runs the full router in-process and speaks JSON to it.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ecm_api::{ApiServer, AppState, TokenService};
use ecm_config::ApiConfig;
use ecm_core::{Identity, InMemoryAuditLogger, MemoryStore};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::fixtures::{cheap_hasher, seeded_store, token_service};

/// A response reduced to status and JSON body (`Null` when empty).
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Parsed body.
    pub body: Value,
}

impl TestResponse {
    /// The `error.code` field of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }
}

/// The API wired to a seeded [`MemoryStore`].
pub struct TestApp {
    /// Backing store; flip availability to simulate outages.
    pub store: Arc<MemoryStore>,
    /// Captured audit entries.
    pub audit: InMemoryAuditLogger,
    /// The app's token service.
    pub tokens: TokenService,
    router: Router,
}

impl TestApp {
    /// Builds the app on the standard fixtures.
    pub fn new() -> Self {
        Self::with_tokens(token_service())
    }

    /// Builds the app with a specific token service.
    pub fn with_tokens(tokens: TokenService) -> Self {
        let store = seeded_store();
        let audit = InMemoryAuditLogger::new();

        let state = AppState::builder()
            .config(ApiConfig::default())
            .token_service(tokens.clone())
            .store(store.clone())
            .hasher(cheap_hasher())
            .audit_logger(Arc::new(audit.clone()))
            .build()
            .expect("complete app state");

        Self {
            store,
            audit,
            tokens,
            router: ApiServer::new(state).router(),
        }
    }

    /// Mints a token for `identity` without going through login.
    pub fn token_for(&self, identity: &Identity) -> String {
        self.tokens.issue(identity).expect("issue token")
    }

    /// Sends a request and parses the response.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// `GET` as `identity`.
    pub async fn get_as(&self, identity: &Identity, path: &str) -> TestResponse {
        let token = self.token_for(identity);
        self.send(Method::GET, path, Some(&token), None).await
    }

    /// `POST` as `identity`.
    pub async fn post_as(&self, identity: &Identity, path: &str, body: Value) -> TestResponse {
        let token = self.token_for(identity);
        self.send(Method::POST, path, Some(&token), Some(body)).await
    }

    /// `PATCH` as `identity`.
    pub async fn patch_as(&self, identity: &Identity, path: &str, body: Value) -> TestResponse {
        let token = self.token_for(identity);
        self.send(Method::PATCH, path, Some(&token), Some(body)).await
    }

    /// Logs in over HTTP.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
