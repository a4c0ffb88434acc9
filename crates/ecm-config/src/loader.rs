// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 3. Parse YAML/TOML/JSON into [`EcmConfig`]
//! 4. Apply `ECM_*` environment overrides
//! 5. Resolve relative key paths against the config file's directory
//! 6. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! ECM_API_HOST=127.0.0.1
//! ECM_API_PORT=9090
//! ECM_LOG_LEVEL=debug
//! ECM_TOKEN_PRIVATE_KEY=/run/secrets/jwt.pem
//! ECM_TOKEN_PUBLIC_KEY=/run/secrets/jwt.pub.pem
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{EcmConfig, LogLevel};

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// # Examples
///
/// ```no_run
/// use ecm_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("ecm.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for resolving relative paths.
    base_path: Option<PathBuf>,

    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve environment variables.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a loader with default settings.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: "ECM".to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Sets the base path for resolving relative paths.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format follows the extension: `.yaml`/`.yml`, `.toml`, or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<EcmConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self.base_path.clone().unwrap_or_else(|| {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            resolve_relative_paths(&mut config, &base_path);
        }

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            departments = config.seed.departments.len(),
            users = config.seed.users.len(),
            algorithm = config.security.token.algorithm.as_str(),
            "Configuration summary"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<EcmConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };
        let mut config = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        if let (true, Some(base)) = (self.resolve_paths, self.base_path.as_deref()) {
            resolve_relative_paths(&mut config, base);
        }

        config.validate()?;
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<EcmConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// An unset variable without a default is left in place.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    fn env_var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = env::var(&name).ok();
        (name, value)
    }

    /// Applies `<PREFIX>_*` environment overrides.
    fn apply_env_overrides(&self, config: &mut EcmConfig) -> ConfigResult<()> {
        if let (name, Some(value)) = self.env_var("API_HOST") {
            config.api.bind_address = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected an IP address"))?;
        }
        if let (name, Some(value)) = self.env_var("API_PORT") {
            config.api.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }
        if let (name, Some(value)) = self.env_var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected a log level"))?;
        }
        if let (_, Some(value)) = self.env_var("TOKEN_PRIVATE_KEY") {
            config.security.token.private_key_path = PathBuf::from(value);
        }
        if let (_, Some(value)) = self.env_var("TOKEN_PUBLIC_KEY") {
            config.security.token.public_key_path = PathBuf::from(value);
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_relative_paths(config: &mut EcmConfig, base_path: &Path) {
    let token = &mut config.security.token;
    if token.private_key_path.is_relative() {
        token.private_key_path = base_path.join(&token.private_key_path);
    }
    if token.public_key_path.is_relative() {
        token.public_key_path = base_path.join(&token.public_key_path);
    }
}

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<EcmConfig> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// YAML parsing goes through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<EcmConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<EcmConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::schema::TokenAlgorithm;

    const YAML: &str = r#"
api:
  port: 9000
security:
  token:
    algorithm: EdDSA
    private_key_path: keys/ed.pem
    public_key_path: /etc/ecm/ed.pub.pem
seed:
  departments:
    - id: 1
      name: Computer Science
  users:
    - id: 1
      name: Admin
      email: admin@uni.ac.uk
      password: admin-password
      role_id: 1
      department_id: 1
"#;

    #[test]
    fn test_load_yaml_resolves_relative_key_paths() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix("ECM_LOADER_TEST_YAML")
            .load(file.path())
            .unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.security.token.algorithm, TokenAlgorithm::EdDSA);
        let dir = file.path().parent().unwrap();
        assert_eq!(config.security.token.private_key_path, dir.join("keys/ed.pem"));
        assert_eq!(
            config.security.token.public_key_path,
            PathBuf::from("/etc/ecm/ed.pub.pem")
        );
        assert_eq!(config.seed.users[0].email, "admin@uni.ac.uk");
        assert_eq!(config.seed.roles.len(), 3);
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[api]
port = 7000

[logging]
level = "debug"
format = "json"
"#;
        let config = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str(toml, ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.api.port, 7000);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("ecm.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("ecm.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("ecm.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("ecm.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("ecm")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let loader = ConfigLoader::new();
        let result = loader.resolve_env_placeholders("port: ${ECM_TEST_SURELY_UNSET:8081}");
        assert_eq!(result, "port: 8081");
    }

    #[test]
    fn test_env_placeholder_kept_when_unset() {
        let loader = ConfigLoader::new();
        let result = loader.resolve_env_placeholders("key: ${ECM_TEST_SURELY_UNSET}");
        assert_eq!(result, "key: ${ECM_TEST_SURELY_UNSET}");
        let unclosed = loader.resolve_env_placeholders("key: ${OPEN");
        assert_eq!(unclosed, "key: ${OPEN");
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("ECM_LOADER_TEST_OVR_API_PORT", "9191");
        env::set_var("ECM_LOADER_TEST_OVR_LOG_LEVEL", "warn");
        env::set_var("ECM_LOADER_TEST_OVR_TOKEN_PUBLIC_KEY", "/keys/pub.pem");

        let config = ConfigLoader::new()
            .with_env_prefix("ECM_LOADER_TEST_OVR")
            .load_from_str("{}", ConfigFormat::Json)
            .unwrap();

        assert_eq!(config.api.port, 9191);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(
            config.security.token.public_key_path,
            PathBuf::from("/keys/pub.pem")
        );
    }

    #[test]
    fn test_invalid_env_override_rejected() {
        env::set_var("ECM_LOADER_TEST_BAD_API_PORT", "not-a-port");
        let result = ConfigLoader::new()
            .with_env_prefix("ECM_LOADER_TEST_BAD")
            .load_from_str("{}", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(br#"{"api": {"prot": 1}}"#).unwrap();
        let result = ConfigLoader::new().with_env_vars(false).load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_file_not_found() {
        let result = ConfigLoader::new().load("/nonexistent/path/ecm.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
