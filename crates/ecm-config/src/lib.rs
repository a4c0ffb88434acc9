// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ecm-config
//!
//! Configuration management for the EC case-management backend.
//!
//! ## Features
//!
//! - **Schema Definition**: API, token, logging, audit, and seed sections
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `${VAR}` placeholders and `ECM_*` variables
//! - **Validation**: errors name the offending field
//!
//! ## Quick Start
//!
//! ```no_run
//! use ecm_config::loader::load_config;
//!
//! let config = load_config("ecm.yaml").unwrap();
//! println!("Listening on {}", config.api.socket_addr());
//! ```
//!
//! ## Configuration Schema
//!
//! - `api` - HTTP server settings
//! - `security.token` - signing algorithm, issuer, lifetime, PEM key paths
//! - `logging` - level and format
//! - `audit` - audit trail switch
//! - `seed` - roles, departments, modules, and users for the in-memory store

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    ApiConfig, AuditConfig, CorsConfig, EcmConfig, LogFormat, LogLevel, LoggingConfig,
    SecretValue, SecurityConfig, SeedConfig, SeedDepartment, SeedModule, SeedRole, SeedUser,
    TokenAlgorithm, TokenConfig,
};
