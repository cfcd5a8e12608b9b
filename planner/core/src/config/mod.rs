//! TOML Configuration File Support
//!
//! Centralized configuration loading for the planner, supporting a TOML file
//! at `~/.config/diet-planner/planner.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://127.0.0.1:5000"
//! request_timeout_secs = 30
//!
//! [ui]
//! notification_timeout_ms = 3000
//! auto_login_delay_ms = 1500
//!
//! [push]
//! worker_path = "/sw.js"
//! app_scope = "/diet-planner/"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application server key the backend's push service was provisioned with
pub const DEFAULT_APPLICATION_SERVER_KEY: &str =
    "BEl62iUYgUivxIkv69yViEuiBIa40HI80NM9f53NlqKOYWmCh_MoCpkHEHqdYrOcHcVwYDbC4VmMwWPLiGkn8ec";

const ENV_API_URL: &str = "DIET_PLANNER_API_URL";
const ENV_TIMEOUT_SECS: &str = "DIET_PLANNER_TIMEOUT_SECS";
const ENV_NOTIFY_MS: &str = "DIET_PLANNER_NOTIFY_MS";
const ENV_AUTO_LOGIN_MS: &str = "DIET_PLANNER_AUTO_LOGIN_MS";
const ENV_WORKER_PATH: &str = "DIET_PLANNER_WORKER_PATH";
const ENV_APP_SCOPE: &str = "DIET_PLANNER_APP_SCOPE";
const ENV_VAPID_KEY: &str = "DIET_PLANNER_VAPID_KEY";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[backend]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Base URL every gateway path is appended to
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// `[ui]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// How long a notification stays visible
    pub notification_timeout_ms: Option<u64>,

    /// Delay between successful registration and the automatic login
    pub auto_login_delay_ms: Option<u64>,
}

/// `[push]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PushToml {
    /// Path the push worker is registered under
    pub worker_path: Option<String>,

    /// Scope opened when a notification is clicked
    pub app_scope: Option<String>,

    /// URL-safe base64 application server key
    pub application_server_key: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerToml {
    /// Backend section
    pub backend: BackendToml,

    /// UI timing section
    pub ui: UiToml,

    /// Push section
    pub push: PushToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Push registration settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushSettings {
    /// Worker registration path
    pub worker_path: String,
    /// Application scope opened by notification clicks
    pub app_scope: String,
    /// URL-safe base64 application server key
    pub application_server_key: String,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            worker_path: "/sw.js".to_string(),
            app_scope: "/diet-planner/".to_string(),
            application_server_key: DEFAULT_APPLICATION_SERVER_KEY.to_string(),
        }
    }
}

/// Centralized configuration for the planner
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// Backend base URL
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Notification auto-dismiss delay
    pub notification_timeout: Duration,

    /// Delay before auto-login after registration
    pub auto_login_delay: Duration,

    /// Push settings
    pub push: PushSettings,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    pub(crate) source: ConfigSource,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            notification_timeout: Duration::from_millis(3000),
            auto_login_delay: Duration::from_millis(1500),
            push: PushSettings::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl PlannerConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values that would make every request fail
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a base URL without an
    /// http(s) scheme, a zero timeout, or an empty server key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.push.application_server_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "application_server_key must not be empty".to_string(),
            ));
        }
        if !self.push.worker_path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "worker_path must be absolute, got '{}'",
                self.push.worker_path
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/diet-planner/planner.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("diet-planner").join("planner.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged configuration is unusable. A missing file is not an error.
pub fn load_config() -> Result<PlannerConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// With `None`, only defaults and environment variables are used.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or fails validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PlannerConfig, ConfigError> {
    let mut config = PlannerConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: PlannerToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut PlannerConfig, toml: &PlannerToml) {
    if let Some(ref url) = toml.backend.base_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = toml.backend.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    if let Some(ms) = toml.ui.notification_timeout_ms {
        config.notification_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.ui.auto_login_delay_ms {
        config.auto_login_delay = Duration::from_millis(ms);
    }

    if let Some(ref path) = toml.push.worker_path {
        config.push.worker_path = path.clone();
    }
    if let Some(ref scope) = toml.push.app_scope {
        config.push.app_scope = scope.clone();
    }
    if let Some(ref key) = toml.push.application_server_key {
        config.push.application_server_key = key.clone();
    }
}

fn apply_env_config(config: &mut PlannerConfig) {
    if let Ok(url) = std::env::var(ENV_API_URL) {
        config.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(value) = std::env::var(ENV_TIMEOUT_SECS) {
        if let Ok(secs) = value.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(value) = std::env::var(ENV_NOTIFY_MS) {
        if let Ok(ms) = value.parse::<u64>() {
            config.notification_timeout = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(value) = std::env::var(ENV_AUTO_LOGIN_MS) {
        if let Ok(ms) = value.parse::<u64>() {
            config.auto_login_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(path) = std::env::var(ENV_WORKER_PATH) {
        config.push.worker_path = path;
        config.source = ConfigSource::Env;
    }
    if let Ok(scope) = std::env::var(ENV_APP_SCOPE) {
        config.push.app_scope = scope;
        config.source = ConfigSource::Env;
    }
    if let Ok(key) = std::env::var(ENV_VAPID_KEY) {
        config.push.application_server_key = key;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,

    /// Notification timeout override (milliseconds)
    pub notification_timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Set notification timeout override
    #[must_use]
    pub fn with_notification_timeout_ms(mut self, ms: u64) -> Self {
        self.notification_timeout_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut PlannerConfig) {
        if self.base_url.is_some()
            || self.request_timeout_secs.is_some()
            || self.notification_timeout_ms.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.notification_timeout_ms {
            config.notification_timeout = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Clean up all environment variables used by config loading.
    fn clear_config_env_vars() {
        for var in [
            ENV_API_URL,
            ENV_TIMEOUT_SECS,
            ENV_NOTIFY_MS,
            ENV_AUTO_LOGIN_MS,
            ENV_WORKER_PATH,
            ENV_APP_SCOPE,
            ENV_VAPID_KEY,
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.notification_timeout, Duration::from_millis(3000));
        assert_eq!(config.auto_login_delay, Duration::from_millis(1500));
        assert_eq!(config.push.worker_path, "/sw.js");
        assert_eq!(config.push.app_scope, "/diet-planner/");
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("diet-planner"));
            assert!(p.to_string_lossy().ends_with("planner.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let toml_content = r#"
[backend]
base_url = "http://planner.local:8080"
request_timeout_secs = 5

[ui]
notification_timeout_ms = 4500
auto_login_delay_ms = 10

[push]
app_scope = "/planner/"
"#;
        let parsed: PlannerToml = toml::from_str(toml_content).unwrap();
        let mut config = PlannerConfig::default();
        apply_toml_config(&mut config, &parsed);

        assert_eq!(config.base_url, "http://planner.local:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.notification_timeout, Duration::from_millis(4500));
        assert_eq!(config.auto_login_delay, Duration::from_millis(10));
        assert_eq!(config.push.app_scope, "/planner/");
        assert_eq!(config.push.worker_path, "/sw.js");
    }

    #[test]
    fn test_parse_empty_toml() {
        let parsed: PlannerToml = toml::from_str("").unwrap();
        let mut config = PlannerConfig::default();
        apply_toml_config(&mut config, &parsed);
        assert_eq!(config.base_url, PlannerConfig::default().base_url);
    }

    #[test]
    fn test_missing_file_graceful() {
        clear_config_env_vars();

        let path = PathBuf::from("/nonexistent/path/planner.toml");
        let config = load_config_from_path(Some(path)).unwrap();

        // Env vars may leak in from parallel tests
        assert!(
            config.source() == ConfigSource::Default || config.source() == ConfigSource::Env,
            "Expected Default or Env source, got: {:?}",
            config.source()
        );
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[backend\nbase_url = 12").unwrap();

        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[backend]\nrequest_timeout_secs = 0\n")
            .unwrap();

        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_rejects_schemeless_url() {
        let config = PlannerConfig {
            base_url: "127.0.0.1:5000".to_string(),
            ..PlannerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_validate_rejects_empty_server_key() {
        let mut config = PlannerConfig::default();
        config.push.application_server_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        clear_config_env_vars();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[backend]\nbase_url = \"http://file.example\"\n")
            .unwrap();

        std::env::set_var(ENV_API_URL, "http://env.example");
        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        clear_config_env_vars();

        // Another test may have cleared the env var before the load
        assert!(
            config.base_url == "http://env.example" || config.base_url == "http://file.example",
            "unexpected base_url: {}",
            config.base_url
        );
        assert!(
            config.source() == ConfigSource::Env || config.source() == ConfigSource::File,
            "Expected Env or File source, got: {:?}",
            config.source()
        );
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = PlannerConfig::default();
        config.base_url = "http://env.example".to_string();
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new()
            .with_base_url("http://cli.example")
            .with_request_timeout_secs(9)
            .apply(&mut config);

        assert_eq!(config.base_url, "http://cli.example");
        assert_eq!(config.request_timeout, Duration::from_secs(9));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = PlannerConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
