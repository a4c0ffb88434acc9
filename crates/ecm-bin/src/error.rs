// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Failures of the `ecm` binary and how they end the process.
//!
//! Every failure falls into one of three classes, each with its own exit
//! code:
//!
//! | Code | Class | Produced by |
//! |------|-------|-------------|
//! | [`EXIT_SETUP`] | the inputs are unusable | config loading, key loading, store seeding |
//! | [`EXIT_SERVER`] | the server stopped with an error | bind failures, a crashed server task |
//! | [`EXIT_COMMAND`] | a one-shot command could not do its I/O | `hash-password`, `validate --format json` |

use ecm_api::{ApiError, AuthError};
use ecm_config::ConfigError;
use ecm_core::StoreError;
use thiserror::Error;

/// Config file, token keys or seed data are unusable.
pub const EXIT_SETUP: i32 = 2;

/// The HTTP server failed after startup began.
pub const EXIT_SERVER: i32 = 3;

/// A command could not read its input or write its output.
pub const EXIT_COMMAND: i32 = 4;

/// Result type alias for ecm-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Failures of the `ecm` binary.
///
/// Display strings are short. The wrapped cause is reached through
/// [`std::error::Error::source`] and printed by [`report_error`].
#[derive(Debug, Error)]
pub enum BinError {
    /// Config file missing, malformed or invalid.
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// Signing or verification keys failed to load.
    #[error("token keys unusable")]
    Keys(#[from] AuthError),

    /// The store refused a seed row.
    #[error("seed data rejected")]
    Seed(#[from] StoreError),

    /// Startup input problem without an underlying error value.
    #[error("{0}")]
    Setup(String),

    /// The server failed to build, bind or serve.
    #[error("server failed")]
    Server(#[from] ApiError),

    /// The server task panicked or was cancelled.
    #[error("server task ended abnormally: {0}")]
    ServerTask(String),

    /// Terminal I/O failed.
    #[error("i/o failure")]
    Io(#[from] std::io::Error),

    /// A command's result could not be produced.
    #[error("{0}")]
    Output(String),

    /// Wraps another failure with what was being attempted.
    #[error("{context}")]
    Context {
        /// The step that failed.
        context: String,
        /// What went wrong.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a [`BinError::Setup`].
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Creates a [`BinError::ServerTask`].
    pub fn server_task(msg: impl Into<String>) -> Self {
        Self::ServerTask(msg.into())
    }

    /// Creates a [`BinError::Output`].
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Wraps `self` under a description of the failed step.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Process exit code for this failure. Context never changes the class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Keys(_) | Self::Seed(_) | Self::Setup(_) => EXIT_SETUP,
            Self::Server(_) | Self::ServerTask(_) => EXIT_SERVER,
            Self::Io(_) | Self::Output(_) => EXIT_COMMAND,
            Self::Context { source, .. } => source.exit_code(),
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// The error message followed by each cause, outermost first.
pub fn error_chain(error: &BinError) -> Vec<String> {
    let mut lines = vec![error.to_string()];
    let mut cause = std::error::Error::source(error);
    while let Some(inner) = cause {
        lines.push(inner.to_string());
        cause = inner.source();
    }
    lines
}

/// Writes the error chain to stderr.
pub fn report_error(error: &BinError) {
    let mut lines = error_chain(error).into_iter();
    if let Some(head) = lines.next() {
        eprintln!("ecm: {}", head);
    }
    for cause in lines {
        eprintln!("  caused by: {}", cause);
    }
}

/// Reports the error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use ecm_core::DependencyError;

    use super::*;

    #[test]
    fn test_context_keeps_class_and_chain() {
        let err = BinError::from(ConfigError::validation("api.port", "must be non-zero"))
            .with_context("Failed to load ecm.yaml");

        assert_eq!(err.exit_code(), EXIT_SETUP);
        let chain = error_chain(&err);
        assert_eq!(chain[0], "Failed to load ecm.yaml");
        assert_eq!(chain[1], "invalid configuration");
        assert!(chain[2].contains("must be non-zero"));
    }

    #[test]
    fn test_setup_failures() {
        assert_eq!(BinError::setup("no config").exit_code(), EXIT_SETUP);
        assert_eq!(
            BinError::from(AuthError::Key("bad pem".into())).exit_code(),
            EXIT_SETUP
        );
        assert_eq!(
            BinError::from(StoreError::DuplicateEmail("a@uni.test".into())).exit_code(),
            EXIT_SETUP
        );
        assert_eq!(
            BinError::from(StoreError::from(DependencyError::new("store", "down"))).exit_code(),
            EXIT_SETUP
        );
    }

    #[test]
    fn test_server_failures() {
        assert_eq!(
            BinError::from(ApiError::internal("address in use")).exit_code(),
            EXIT_SERVER
        );
        assert_eq!(BinError::server_task("panicked").exit_code(), EXIT_SERVER);
    }

    #[test]
    fn test_command_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err = BinError::from(io);
        assert_eq!(err.exit_code(), EXIT_COMMAND);
        assert_eq!(error_chain(&err), vec!["i/o failure", "stdout closed"]);
        assert_eq!(BinError::output("empty password").exit_code(), EXIT_COMMAND);
    }

    #[test]
    fn test_classes_are_distinct() {
        assert_ne!(EXIT_SETUP, EXIT_SERVER);
        assert_ne!(EXIT_SERVER, EXIT_COMMAND);
        assert_ne!(EXIT_SETUP, EXIT_COMMAND);
    }
}
