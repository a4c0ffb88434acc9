// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions.
//!
//! # Schema Structure
//!
//! ```text
//! EcmConfig
//! ├── api: ApiConfig
//! ├── security: SecurityConfig
//! │   └── token: TokenConfig
//! ├── logging: LoggingConfig
//! ├── audit: AuditConfig
//! └── seed: SeedConfig
//! ```

use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ecm_core::Role;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default token lifetime in seconds (24 hours).
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 86_400;

/// Default token issuer.
pub const DEFAULT_TOKEN_ISSUER: &str = "self";

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EcmConfig {
    /// API server configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Security configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Audit configuration.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Reference data and accounts loaded into the in-memory store.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl EcmConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.security.validate()?;
        self.seed.validate()?;
        Ok(())
    }
}

// =============================================================================
// API Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

impl ApiConfig {
    /// Validates the API configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "api.request_timeout_secs",
                "cannot be zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation("api.max_body_size", "cannot be zero"));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: DEFAULT_API_PORT,
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (use "*" for all, empty disables CORS).
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Max age in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_secs: default_max_age(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Security configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Session token configuration.
    #[serde(default)]
    pub token: TokenConfig,
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.token.validate()
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: TokenAlgorithm,

    /// Issuer claim written into and required on every token.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_lifetime")]
    pub lifetime_secs: u64,

    /// PEM file holding the signing key.
    #[serde(default = "default_private_key_path")]
    pub private_key_path: PathBuf,

    /// PEM file holding the verification key.
    #[serde(default = "default_public_key_path")]
    pub public_key_path: PathBuf,
}

fn default_issuer() -> String {
    DEFAULT_TOKEN_ISSUER.to_string()
}

fn default_lifetime() -> u64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

fn default_private_key_path() -> PathBuf {
    PathBuf::from("keys/private.pem")
}

fn default_public_key_path() -> PathBuf {
    PathBuf::from("keys/public.pem")
}

impl TokenConfig {
    /// Validates the token configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::validation(
                "security.token.issuer",
                "cannot be empty",
            ));
        }
        if self.lifetime_secs == 0 {
            return Err(ConfigError::validation(
                "security.token.lifetime_secs",
                "cannot be zero",
            ));
        }
        if self.private_key_path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "security.token.private_key_path",
                "cannot be empty",
            ));
        }
        if self.public_key_path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "security.token.public_key_path",
                "cannot be empty",
            ));
        }
        Ok(())
    }

    /// Returns the lifetime as a Duration.
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_secs)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            algorithm: TokenAlgorithm::default(),
            issuer: default_issuer(),
            lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            private_key_path: default_private_key_path(),
            public_key_path: default_public_key_path(),
        }
    }
}

/// Asymmetric token signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TokenAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256.
    #[default]
    RS256,
    /// Ed25519.
    EdDSA,
}

impl TokenAlgorithm {
    /// Returns the JOSE algorithm name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAlgorithm::RS256 => "RS256",
            TokenAlgorithm::EdDSA => "EdDSA",
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON lines.
    Json,
}

// =============================================================================
// Audit Configuration
// =============================================================================

/// Audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether audit events are recorded.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// =============================================================================
// Seed Configuration
// =============================================================================

/// Reference data and accounts for the in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Role rows.
    #[serde(default = "default_roles")]
    pub roles: Vec<SeedRole>,

    /// Department rows.
    #[serde(default)]
    pub departments: Vec<SeedDepartment>,

    /// Modules.
    #[serde(default)]
    pub modules: Vec<SeedModule>,

    /// User accounts.
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

fn default_roles() -> Vec<SeedRole> {
    Role::ALL
        .iter()
        .enumerate()
        .map(|(index, role)| SeedRole {
            id: index as i64 + 1,
            name: role.as_str().to_string(),
        })
        .collect()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            roles: default_roles(),
            departments: Vec::new(),
            modules: Vec::new(),
            users: Vec::new(),
        }
    }
}

impl SeedConfig {
    /// Validates cross references between seed tables.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut role_ids = HashSet::new();
        for (i, role) in self.roles.iter().enumerate() {
            if Role::parse(&role.name).is_none() {
                return Err(ConfigError::validation(
                    format!("seed.roles[{}].name", i),
                    format!("unknown role '{}'", role.name),
                ));
            }
            if !role_ids.insert(role.id) {
                return Err(ConfigError::validation(
                    format!("seed.roles[{}].id", i),
                    format!("duplicate id {}", role.id),
                ));
            }
        }

        let mut department_ids = HashSet::new();
        for (i, department) in self.departments.iter().enumerate() {
            if !department_ids.insert(department.id) {
                return Err(ConfigError::validation(
                    format!("seed.departments[{}].id", i),
                    format!("duplicate id {}", department.id),
                ));
            }
        }

        let mut codes = HashSet::new();
        for (i, module) in self.modules.iter().enumerate() {
            if module.code.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("seed.modules[{}].code", i),
                    "cannot be empty",
                ));
            }
            if !codes.insert(module.code.as_str()) {
                return Err(ConfigError::validation(
                    format!("seed.modules[{}].code", i),
                    format!("duplicate code '{}'", module.code),
                ));
            }
            if !department_ids.contains(&module.department_id) {
                return Err(ConfigError::validation(
                    format!("seed.modules[{}].department_id", i),
                    format!("unknown department {}", module.department_id),
                ));
            }
        }

        let mut emails = HashSet::new();
        let mut user_ids = HashSet::new();
        for (i, user) in self.users.iter().enumerate() {
            let field = |name: &str| format!("seed.users[{}].{}", i, name);

            if user.email.trim().is_empty() {
                return Err(ConfigError::validation(field("email"), "cannot be empty"));
            }
            if !emails.insert(user.email.to_lowercase()) {
                return Err(ConfigError::validation(
                    field("email"),
                    format!("duplicate email '{}'", user.email),
                ));
            }
            if let Some(id) = user.id {
                if !user_ids.insert(id) {
                    return Err(ConfigError::validation(
                        field("id"),
                        format!("duplicate id {}", id),
                    ));
                }
            }
            if !role_ids.contains(&user.role_id) {
                return Err(ConfigError::validation(
                    field("role_id"),
                    format!("unknown role {}", user.role_id),
                ));
            }
            if !department_ids.contains(&user.department_id) {
                return Err(ConfigError::validation(
                    field("department_id"),
                    format!("unknown department {}", user.department_id),
                ));
            }
            match (&user.password, &user.password_hash) {
                (Some(_), Some(_)) => {
                    return Err(ConfigError::validation(
                        field("password"),
                        "set either password or password_hash, not both",
                    ))
                }
                (None, None) => {
                    return Err(ConfigError::validation(
                        field("password"),
                        "one of password or password_hash is required",
                    ))
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// A seeded role row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedRole {
    /// Primary key.
    pub id: i64,
    /// Role name, e.g. `Academic_Staff`.
    pub name: String,
}

/// A seeded department row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDepartment {
    /// Primary key.
    pub id: i64,
    /// Department name.
    pub name: String,
}

/// A seeded module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedModule {
    /// Module code.
    pub code: String,
    /// Module title.
    pub name: String,
    /// Owning department.
    pub department_id: i64,
}

/// A seeded user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    /// Fixed id; assigned sequentially when absent.
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain password, hashed at startup.
    #[serde(default)]
    pub password: Option<SecretValue>,
    /// Pre-computed PHC hash.
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Role row id.
    pub role_id: i64,
    /// Department id.
    pub department_id: i64,
    /// Approval flag.
    #[serde(default = "default_enabled")]
    pub is_approved: bool,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret that never appears in `Debug`, `Display`, or serialized output.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for SecretValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}
