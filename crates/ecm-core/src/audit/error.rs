// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit error types.

use thiserror::Error;

/// Result type alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Errors that can occur during audit logging.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The entry could not be written.
    #[error("Failed to write audit log: {message}")]
    WriteFailed {
        /// Error message.
        message: String,
    },

    /// The entry could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuditError {
    /// Creates a write failure.
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
        }
    }
}
