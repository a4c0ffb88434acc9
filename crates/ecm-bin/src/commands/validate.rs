// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use ecm_api::TokenService;
use ecm_config::EcmConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command.
///
/// Beyond schema validation, checks that the token keys load.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = ecm_config::load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;

    let key_error = TokenService::from_config(&config.security.token)
        .err()
        .map(|e| e.to_string());
    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  API: {}", config.api.socket_addr());
            println!(
                "  Token: {} (issuer '{}', lifetime {}s)",
                config.security.token.algorithm.as_str(),
                config.security.token.issuer,
                config.security.token.lifetime_secs
            );
            println!(
                "  Keys: {}",
                key_error.as_deref().unwrap_or("loaded")
            );
            println!("  Departments: {}", config.seed.departments.len());
            println!("  Modules: {}", config.seed.modules.len());
            println!("  Users: {}", config.seed.users.len());
            println!(
                "  Audit: {}",
                if config.audit.enabled { "enabled" } else { "disabled" }
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": key_error.is_none(),
                "config_path": config_path.display().to_string(),
                "summary": {
                    "api": config.api.socket_addr().to_string(),
                    "algorithm": config.security.token.algorithm.as_str(),
                    "issuer": config.security.token.issuer,
                    "lifetime_secs": config.security.token.lifetime_secs,
                    "departments": config.seed.departments.len(),
                    "modules": config.seed.modules.len(),
                    "users": config.seed.users.len(),
                    "audit_enabled": config.audit.enabled,
                },
                "key_error": key_error,
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| BinError::output(e.to_string()))?
            );
        }
    }

    match key_error {
        Some(message) => Err(BinError::setup(format!("Token keys: {}", message))),
        None => Ok(()),
    }
}

/// Non-fatal findings worth reporting.
fn collect_warnings(config: &EcmConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.seed.users.is_empty() {
        warnings.push("No users seeded; only registration can create accounts".to_string());
    }
    if !config
        .seed
        .users
        .iter()
        .any(|u| config.seed.roles.iter().any(|r| r.id == u.role_id && r.name == "Administrator"))
    {
        warnings.push("No administrator account seeded".to_string());
    }
    if config.api.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin".to_string());
    }
    if !config.audit.enabled {
        warnings.push("Audit logging is disabled".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_warnings() {
        let warnings = collect_warnings(&EcmConfig::default());
        assert!(warnings.iter().any(|w| w.contains("No users")));
        assert!(warnings.iter().any(|w| w.contains("administrator")));
    }
}
