// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ecm-bin
//!
//! CLI binary for the EC case-management backend.
//!
//! This crate provides the `ecm` entry point, including:
//!
//! - CLI argument parsing with clap
//! - Service runtime orchestration (seeded store, token keys, API server)
//! - Graceful shutdown handling
//! - Logging initialization
//! - Command implementations (run, validate, version, hash-password)
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────┐
//!                    │   main.rs   │
//!                    └──────┬──────┘
//!                    ┌──────▼──────┐
//!                    │   cli.rs    │
//!                    └──────┬──────┘
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │ runtime  │ │ logging  │
//!        └──────────┘ └────┬─────┘ └──────────┘
//!                    ┌─────▼──────┐
//!                    │  shutdown  │
//!                    └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! ecm
//!
//! # Start with custom config
//! ecm -c /etc/ecm/ecm.yaml
//!
//! # Validate configuration
//! ecm validate
//!
//! # Produce a password hash for a seed file
//! ecm hash-password "correct horse"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::{init_logging, LogSettings};
pub use runtime::{build_store, RuntimeBuilder, ServiceRuntime};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
