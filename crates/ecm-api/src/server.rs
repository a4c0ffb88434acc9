// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use ecm_config::ApiConfig;
use ecm_core::{AuditLogger, CredentialStore, RecordStore, ResourceGateway, UserDirectory};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::TokenService;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::AuthLayer;
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let cors = create_cors_layer(&self.config);
        let auth = AuthLayer::new(self.state.authenticator.clone()).with_default_public_paths();

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout(),
            ))
            .layer(cors)
            .layer(auth);

        Router::new()
            // Public
            .route("/health", get(handlers::health))
            .route("/auth/login", post(handlers::login))
            .route("/auth/register", post(handlers::register))
            .route("/roles", get(handlers::list_roles))
            .route("/departments", get(handlers::list_departments))
            // Identity
            .route("/auth/me", get(handlers::current_user))
            // EC applications
            .route(
                "/ec-applications",
                get(handlers::list_applications).post(handlers::create_application),
            )
            .route(
                "/ec-applications/{id}",
                get(handlers::get_application).patch(handlers::update_application),
            )
            // Nested records
            .route("/evidence/{id}", get(handlers::get_evidence))
            .route("/module-requests", post(handlers::create_module_request))
            .route("/module-requests/{id}", get(handlers::get_module_request))
            .route("/module-decisions", post(handlers::create_module_decision))
            .route("/module-decisions/{id}", get(handlers::get_module_decision))
            .route(
                "/student-information",
                post(handlers::create_student_information),
            )
            .route(
                "/student-information/{id}",
                get(handlers::get_student_information),
            )
            // Modules
            .route("/modules", post(handlers::create_module))
            .route(
                "/modules/{code}",
                axum::routing::patch(handlers::update_module),
            )
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until the process is stopped.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// An empty origin list allows no cross-origin callers.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let origins = if cors.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let list: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(cors.max_age_secs))
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the token service.
    pub fn token_service(mut self, tokens: TokenService) -> Self {
        self.state_builder = self.state_builder.token_service(tokens);
        self
    }

    /// Uses one backend for every store collaborator.
    pub fn store<S>(mut self, store: Arc<S>) -> Self
    where
        S: CredentialStore + ResourceGateway + UserDirectory + RecordStore + 'static,
    {
        self.state_builder = self.state_builder.store(store);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.state_builder = self.state_builder.audit_logger(logger);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenKeys;
    use axum::body::Body;
    use axum::http::Request;
    use ecm_config::TokenAlgorithm;
    use ecm_core::MemoryStore;
    use tower::ServiceExt;

    fn server() -> ApiServer {
        let keys = TokenKeys::from_pem(
            TokenAlgorithm::RS256,
            include_bytes!("../testdata/rsa_private.pem"),
            include_bytes!("../testdata/rsa_public.pem"),
        )
        .unwrap();

        ApiServerBuilder::new()
            .config(ApiConfig::default())
            .token_service(TokenService::new(keys))
            .store(Arc::new(MemoryStore::with_default_roles()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_server_builder() {
        assert_eq!(server().addr().port(), ApiConfig::default().port);
        assert!(ApiServerBuilder::new().build().is_err());
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = server()
            .router()
            .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_roles_are_public() {
        let response = server()
            .router()
            .oneshot(Request::get("/roles").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let mut config = ApiConfig::default();
        config.cors.allowed_origins = vec!["https://ok.test".into(), "bad\norigin".into()];
        let _layer = create_cors_layer(&config);
    }
}
