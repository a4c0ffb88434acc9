// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit logging for security-relevant events.
//!
//! Login attempts, registrations, and authorization denials are recorded
//! through the [`AuditLogger`] trait.
//!
//! # Components
//!
//! - [`AuditLogger`]: trait for logger implementations
//! - [`AuditLog`]: structured entry
//! - [`NoOpAuditLogger`]: discards entries
//! - [`TracingAuditLogger`]: emits entries as `tracing` events on the `audit` target
//! - [`InMemoryAuditLogger`]: keeps entries for inspection in tests

mod error;
mod memory_logger;
mod types;

pub use error::{AuditError, AuditResult};
pub use memory_logger::InMemoryAuditLogger;
pub use types::{ActionResult, AuditAction, AuditLog, AuditResource, AuditSeverity};

use async_trait::async_trait;

// =============================================================================
// Core Trait
// =============================================================================

/// Trait for audit logger implementations.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Records an entry.
    async fn log(&self, entry: AuditLog) -> AuditResult<()>;

    /// Flushes buffered entries.
    async fn flush(&self) -> AuditResult<()>;

    /// Returns the logger name.
    fn name(&self) -> &str {
        "audit_logger"
    }

    /// Returns `true` if the logger can accept entries.
    async fn health_check(&self) -> bool {
        true
    }
}

// =============================================================================
// No-Op Logger
// =============================================================================

/// Discards all entries.
#[derive(Debug, Default, Clone)]
pub struct NoOpAuditLogger;

impl NoOpAuditLogger {
    /// Creates a new no-op logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _entry: AuditLog) -> AuditResult<()> {
        Ok(())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

// =============================================================================
// Tracing Logger
// =============================================================================

/// Emits each entry as a structured `tracing` event with target `audit`.
///
/// Denials and failed logins are emitted at `warn`, everything else at `info`.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditLogger;

impl TracingAuditLogger {
    /// Creates a new tracing logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let details = serde_json::to_string(&entry.details)?;
        let user = entry.user_id.as_deref().unwrap_or("-");
        let resource = entry.resource.full_path();

        if entry.severity.level() >= AuditSeverity::Warning.level() {
            tracing::warn!(
                target: "audit",
                audit_id = %entry.id,
                action = %entry.action,
                user = user,
                resource = %resource,
                result = entry.result.as_str(),
                correlation_id = ?entry.correlation_id,
                details = %details,
                "Audit event"
            );
        } else {
            tracing::info!(
                target: "audit",
                audit_id = %entry.id,
                action = %entry.action,
                user = user,
                resource = %resource,
                result = entry.result.as_str(),
                correlation_id = ?entry.correlation_id,
                details = %details,
                "Audit event"
            );
        }
        Ok(())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

// =============================================================================
// Tests
// =============================================================================
