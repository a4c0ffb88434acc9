// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! - Configuration loading and validation
//! - In-memory store seeding
//! - Token key loading
//! - API server startup and graceful shutdown

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ecm_api::{ApiServerBuilder, TokenService};
use ecm_config::{load_config, EcmConfig, SeedConfig};
use ecm_core::{
    Argon2Hasher, AuditLogger, Department, DepartmentId, MemoryStore, Module, NewUser, NoOpAuditLogger,
    RoleId, RoleInfo, TracingAuditLogger, UserId,
};
use tracing::{info, warn};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServiceRuntime
// =============================================================================

/// Runs the API server until shutdown is signaled.
pub struct ServiceRuntime {
    config: Arc<EcmConfig>,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a new runtime.
    pub fn new(config: EcmConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the service until shutdown is signaled or the server fails.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting ECM v{}", crate::VERSION);

        let hasher = Argon2Hasher::new();
        let store = Arc::new(build_store(&self.config.seed, &hasher)?);
        info!(users = store.user_count(), "Store seeded");

        let tokens = TokenService::from_config(&self.config.security.token)
            .map_err(|e| BinError::from(e).with_context("Failed to load token keys"))?;
        info!(
            algorithm = self.config.security.token.algorithm.as_str(),
            issuer = tokens.issuer(),
            lifetime_secs = tokens.lifetime_secs(),
            "Token service ready"
        );

        let server = ApiServerBuilder::new()
            .config(self.config.api.clone())
            .token_service(tokens)
            .store(store)
            .audit_logger(self.create_audit_logger())
            .build()?;

        let mut server_task =
            tokio::spawn(server.run_with_shutdown(self.shutdown.shutdown_signal()));

        let result = tokio::select! {
            joined = &mut server_task => flatten(joined),
            _ = self.shutdown.wait_for_shutdown() => {
                info!("Shutdown initiated, draining connections...");
                flatten(server_task.await)
            }
        };

        info!("ECM shutdown complete");
        result
    }

    fn create_audit_logger(&self) -> Arc<dyn AuditLogger> {
        if self.config.audit.enabled {
            info!("Audit logging enabled");
            Arc::new(TracingAuditLogger::new())
        } else {
            info!("Audit logging disabled");
            Arc::new(NoOpAuditLogger::new())
        }
    }
}

fn flatten(
    joined: Result<ecm_api::ApiResult<()>, tokio::task::JoinError>,
) -> BinResult<()> {
    match joined {
        Ok(result) => result.map_err(BinError::from),
        Err(e) => Err(BinError::server_task(e.to_string())),
    }
}

// =============================================================================
// Store Seeding
// =============================================================================

/// Builds the in-memory store from the seed section.
///
/// Plain passwords are hashed here. Users without an id receive the lowest
/// ids not taken by users that have one.
pub fn build_store(seed: &SeedConfig, hasher: &Argon2Hasher) -> BinResult<MemoryStore> {
    let store = MemoryStore::new();

    for role in &seed.roles {
        store.insert_role(RoleInfo {
            id: RoleId::new(role.id),
            name: role.name.clone(),
        });
    }
    for department in &seed.departments {
        store.insert_department(Department {
            id: DepartmentId::new(department.id),
            name: department.name.clone(),
        });
    }
    for module in &seed.modules {
        store.insert_module(Module {
            code: module.code.clone(),
            name: module.name.clone(),
            department_id: DepartmentId::new(module.department_id),
        });
    }

    let taken: HashSet<i64> = seed.users.iter().filter_map(|u| u.id).collect();
    let mut next_id = 1;

    for user in &seed.users {
        let id = match user.id {
            Some(id) => id,
            None => {
                while taken.contains(&next_id) {
                    next_id += 1;
                }
                next_id += 1;
                next_id - 1
            }
        };

        let password_hash = match (&user.password_hash, &user.password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(password)) => hasher.hash(password.expose()).map_err(|e| {
                BinError::setup(format!("Failed to hash password for {}: {}", user.email, e))
            })?,
            (None, None) => {
                return Err(BinError::setup(format!(
                    "User {} has neither password nor password_hash",
                    user.email
                )))
            }
        };

        if !user.is_approved {
            warn!(email = %user.email, "Seeded user is not approved");
        }

        store.insert_user(
            UserId::new(id),
            NewUser {
                name: user.name.clone(),
                email: user.email.clone(),
                password_hash,
                role_id: RoleId::new(user.role_id),
                department_id: DepartmentId::new(user.department_id),
                is_approved: user.is_approved,
            },
        )?;
    }

    Ok(store)
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the service runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<EcmConfig>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: EcmConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::setup("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("Failed to load {}", path.display()))
                })?
            }
        };

        if let Some(port) = self.port {
            config.api.port = port;
        }

        Ok(ServiceRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ecm_config::{SecretValue, SeedDepartment, SeedModule, SeedUser};
    use ecm_core::{verify_password, CredentialStore, RecordStore, UserDirectory};

    fn cheap_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1, 1).unwrap()
    }

    fn user(id: Option<i64>, email: &str, role_id: i64) -> SeedUser {
        SeedUser {
            id,
            name: email.to_string(),
            email: email.to_string(),
            password: Some(SecretValue::new("pw")),
            password_hash: None,
            role_id,
            department_id: 1,
            is_approved: true,
        }
    }

    fn seed() -> SeedConfig {
        SeedConfig {
            departments: vec![SeedDepartment {
                id: 1,
                name: "Computing".into(),
            }],
            modules: vec![SeedModule {
                code: "CS101".into(),
                name: "Programming".into(),
                department_id: 1,
            }],
            users: vec![
                user(Some(1), "admin@uni.test", 1),
                user(None, "staff@uni.test", 2),
                user(Some(2), "s2@uni.test", 3),
                user(None, "s3@uni.test", 3),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_build_store_assigns_free_ids() {
        let store = build_store(&seed(), &cheap_hasher()).unwrap();
        assert_eq!(store.user_count(), 4);

        let staff = store.find_by_id(UserId::new(3)).await.unwrap().unwrap();
        assert_eq!(staff.email, "staff@uni.test");
        let student = store.find_by_id(UserId::new(4)).await.unwrap().unwrap();
        assert_eq!(student.email, "s3@uni.test");
        assert!(verify_password(&student.password_hash, "pw"));
    }

    #[tokio::test]
    async fn test_build_store_loads_reference_data() {
        let store = build_store(&seed(), &cheap_hasher()).unwrap();

        assert_eq!(store.list_roles().await.unwrap().len(), 3);
        assert_eq!(store.list_departments().await.unwrap().len(), 1);
        assert!(store
            .update_module("CS101", Default::default())
            .await
            .is_ok());
    }

    #[test]
    fn test_build_store_rejects_unknown_role() {
        let mut seed = seed();
        seed.users.push(user(Some(9), "x@uni.test", 42));
        assert!(build_store(&seed, &cheap_hasher()).is_err());
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = RuntimeBuilder::new()
            .config(EcmConfig::default())
            .port(Some(9100))
            .build()
            .unwrap();
        assert_eq!(runtime.config.api.port, 9100);

        assert!(RuntimeBuilder::new().build().is_err());
    }
}
