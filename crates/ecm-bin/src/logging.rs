// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.
//!
//! The level and format come from the `logging` section of the config file,
//! overridden by CLI flags, overridden in turn by `RUST_LOG`.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, LogFormat};

/// Directives appended to every filter to keep the HTTP stack quiet.
const DEPENDENCY_DIRECTIVES: &str = "hyper=warn,tower=warn,tower_http=info,axum=info";

// =============================================================================
// LogSettings
// =============================================================================

/// Effective logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter level, e.g. `info`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogSettings {
    /// Resolves settings from the config file (if it loads) and CLI flags.
    ///
    /// Config errors are ignored here; the command reports them once logging
    /// is up.
    pub fn resolve(cli: &Cli) -> Self {
        let base = ecm_config::load_config(&cli.config)
            .map(|config| Self {
                level: config.logging.level.as_str().to_string(),
                format: config.logging.format.into(),
            })
            .unwrap_or_default();

        base.with_overrides(cli)
    }

    /// Applies CLI overrides.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(level) = cli.log_level_override() {
            self.level = level.to_string();
        }
        if let Some(format) = cli.log_format {
            self.format = format;
        }
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", self.level, DEPENDENCY_DIRECTIVES)))
    }
}

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// # Example
///
/// ```ignore
/// use ecm_bin::logging::{init_logging, LogSettings};
///
/// init_logging(&LogSettings::default());
/// ```
pub fn init_logging(settings: &LogSettings) {
    let filter = settings.filter();

    match settings.format {
        LogFormat::Text => init_text_logging(filter),
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Compact => init_compact_logging(filter),
    }
}

/// Initializes text-based logging (default).
fn init_text_logging(filter: EnvFilter) {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .init();
}

/// Initializes JSON logging (for log aggregation).
fn init_json_logging(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .init();
}

/// Initializes compact logging (minimal output).
fn init_compact_logging(filter: EnvFilter) {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .init();
}

// =============================================================================
// Log Level Parsing
// =============================================================================

/// Parses a log level string into a `Level`, defaulting to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match ecm_config::LogLevel::parse(level) {
        Some(ecm_config::LogLevel::Trace) => Level::TRACE,
        Some(ecm_config::LogLevel::Debug) => Level::DEBUG,
        Some(ecm_config::LogLevel::Warn) => Level::WARN,
        Some(ecm_config::LogLevel::Error) => Level::ERROR,
        Some(ecm_config::LogLevel::Info) | None => Level::INFO,
    }
}

// =============================================================================
// Tests
// =============================================================================
