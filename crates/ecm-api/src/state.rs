// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use ecm_config::ApiConfig;
use ecm_core::{
    Action, Argon2Hasher, AuditLog, AuditLogger, CredentialStore, NoOpAuditLogger, RecordStore,
    ResourceGateway, UserDirectory,
};

use crate::auth::{AccessPolicy, Authenticator, Caller, Decision, ResourceRef, TokenService};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Login and token identification.
    pub authenticator: Arc<Authenticator>,
    /// Access policy engine.
    pub policy: Arc<AccessPolicy>,
    /// Registration and reference data.
    pub users: Arc<dyn UserDirectory>,
    /// Case records.
    pub records: Arc<dyn RecordStore>,
    /// Password hasher for registration.
    pub hasher: Arc<Argon2Hasher>,
    /// Audit logger.
    pub audit_logger: Arc<dyn AuditLogger>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the authenticator.
    pub fn auth(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        self.authenticator.tokens()
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit_logger
    }

    /// Records an audit entry. Failures are logged and otherwise ignored.
    pub async fn record_audit(&self, entry: AuditLog) {
        if let Err(e) = self.audit_logger.log(entry).await {
            tracing::warn!(error = %e, logger = self.audit_logger.name(), "Failed to write audit entry");
        }
    }

    /// Runs the access policy for `caller`, auditing any denial.
    ///
    /// Gateway failures become 502, never 403.
    pub async fn authorize(
        &self,
        caller: &Caller,
        action: Action,
        resource: ResourceRef,
    ) -> ApiResult<()> {
        let decision = self
            .policy
            .authorize(&caller.identity, action, &resource)
            .await?;

        let Decision::Deny(reason) = decision else {
            return Ok(());
        };

        tracing::warn!(
            user_id = %caller.user_id(),
            role = %caller.role(),
            action = %action,
            resource = %resource,
            reason = %reason,
            "Access denied"
        );

        let entry = AuditLog::access_denied(
            action,
            resource.to_audit_resource(),
            caller.user_id(),
            caller.client_ip,
            reason.as_str(),
        )
        .with_correlation_id(caller.request_id);
        self.record_audit(entry).await;

        Err(reason.into_error().into())
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    tokens: Option<TokenService>,
    credentials: Option<Arc<dyn CredentialStore>>,
    gateway: Option<Arc<dyn ResourceGateway>>,
    users: Option<Arc<dyn UserDirectory>>,
    records: Option<Arc<dyn RecordStore>>,
    hasher: Option<Arc<Argon2Hasher>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token service.
    pub fn token_service(mut self, tokens: TokenService) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Uses one backend for every collaborator.
    pub fn store<S>(mut self, store: Arc<S>) -> Self
    where
        S: CredentialStore + ResourceGateway + UserDirectory + RecordStore + 'static,
    {
        self.credentials = Some(store.clone());
        self.gateway = Some(store.clone());
        self.users = Some(store.clone());
        self.records = Some(store);
        self
    }

    /// Sets the credential store.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the ownership gateway.
    pub fn gateway(mut self, gateway: Arc<dyn ResourceGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Sets the user directory.
    pub fn users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    /// Sets the record store.
    pub fn records(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.records = Some(records);
        self
    }

    /// Sets the password hasher.
    pub fn hasher(mut self, hasher: Argon2Hasher) -> Self {
        self.hasher = Some(Arc::new(hasher));
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if the token service or any store collaborator is missing.
    pub fn build(self) -> ApiResult<AppState> {
        let tokens = self.tokens.ok_or_else(|| missing("token service"))?;
        let credentials = self.credentials.ok_or_else(|| missing("credential store"))?;
        let gateway = self.gateway.ok_or_else(|| missing("resource gateway"))?;
        let users = self.users.ok_or_else(|| missing("user directory"))?;
        let records = self.records.ok_or_else(|| missing("record store"))?;

        Ok(AppState {
            config: Arc::new(self.config.unwrap_or_default()),
            authenticator: Arc::new(Authenticator::new(credentials, tokens)),
            policy: Arc::new(AccessPolicy::new(gateway)),
            users,
            records,
            hasher: self.hasher.unwrap_or_default(),
            audit_logger: self
                .audit_logger
                .unwrap_or_else(|| Arc::new(NoOpAuditLogger::new())),
        })
    }
}

fn missing(component: &str) -> ApiError {
    ApiError::internal(format!("{} is not configured", component))
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<AccessPolicy> {
    fn from_ref(state: &AppState) -> Self {
        state.policy.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
