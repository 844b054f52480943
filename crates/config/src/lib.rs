//! Configuration loading, validation, and management for prepwise.
//!
//! Loads configuration from `~/.prepwise/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.prepwise/config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Planning boundaries and syllabus source
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Document store backend
    #[serde(default)]
    pub store: StoreConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gateway", &self.gateway)
            .field("planner", &self.planner)
            .field("store", &self.store)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer tokens accepted on `/v1/admin`. Empty = admin routes are open.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin_tokens: Vec<String>,

    #[serde(default)]
    pub allow_public_bind: bool,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    42618
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_tokens: vec![],
            allow_public_bind: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "admin_tokens",
                &format_args!("[{} REDACTED]", self.admin_tokens.len()),
            )
            .field("allow_public_bind", &self.allow_public_bind)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_min_days")]
    pub min_days: u32,

    #[serde(default = "default_max_days")]
    pub max_days: u32,

    /// Syllabus JSON file. Unset = the built-in GATE CSE syllabus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllabus_path: Option<PathBuf>,
}

fn default_min_days() -> u32 {
    7
}
fn default_max_days() -> u32 {
    120
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_days: default_min_days(),
            max_days: default_max_days(),
            syllabus_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory" or "file"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Snapshot file for the "file" backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_store_backend() -> String {
    "memory".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// Snapshot path for the file backend, defaulting to `~/.prepwise/store.json`.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("store.json"))
    }
}

const KNOWN_BACKENDS: &[&str] = &["memory", "file"];

impl AppConfig {
    /// Load configuration from the default path (~/.prepwise/config.toml).
    ///
    /// Environment overrides:
    /// - `PREPWISE_SYLLABUS`: syllabus JSON path
    /// - `PREPWISE_STORE_PATH`: snapshot path, switches the store to `file`
    /// - `PREPWISE_ADMIN_TOKEN`: extra admin bearer token
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PREPWISE_SYLLABUS").filter(|v| !v.is_empty()) {
            self.planner.syllabus_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("PREPWISE_STORE_PATH").filter(|v| !v.is_empty()) {
            self.store.backend = "file".into();
            self.store.path = Some(PathBuf::from(path));
        }

        if let Some(token) = lookup("PREPWISE_ADMIN_TOKEN").filter(|v| !v.is_empty()) {
            if !self.gateway.admin_tokens.contains(&token) {
                self.gateway.admin_tokens.push(token);
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".prepwise")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planner.min_days == 0 {
            return Err(ConfigError::ValidationError(
                "planner.min_days must be at least 1".into(),
            ));
        }

        if self.planner.min_days > self.planner.max_days {
            return Err(ConfigError::ValidationError(format!(
                "planner.min_days ({}) must not exceed planner.max_days ({})",
                self.planner.min_days, self.planner.max_days
            )));
        }

        if !KNOWN_BACKENDS.contains(&self.store.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown store.backend '{}' (expected one of: {})",
                self.store.backend,
                KNOWN_BACKENDS.join(", ")
            )));
        }

        if self.gateway.host == "0.0.0.0" && !self.gateway.allow_public_bind {
            return Err(ConfigError::ValidationError(
                "gateway.host 0.0.0.0 requires gateway.allow_public_bind = true".into(),
            ));
        }

        if self.gateway.max_body_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.max_body_bytes must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 42618);
        assert_eq!(config.planner.min_days, 7);
        assert_eq!(config.planner.max_days, 120);
        assert_eq!(config.store.backend, "memory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.planner.max_days, config.planner.max_days);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[planner]\nmax_days = 90\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.planner.max_days, 90);
        assert_eq!(config.planner.min_days, 7);
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn inverted_day_bounds_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[planner]\nmin_days = 30\nmax_days = 10\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("min_days"));
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut config = AppConfig::default();
        config.store.backend = "postgres".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn public_bind_requires_opt_in() {
        let mut config = AppConfig::default();
        config.gateway.host = "0.0.0.0".into();
        assert!(config.validate().is_err());
        config.gateway.allow_public_bind = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway\nport = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path).unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.gateway.port, 42618);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PREPWISE_SYLLABUS", "/data/syllabus.json"),
            ("PREPWISE_STORE_PATH", "/data/store.json"),
            ("PREPWISE_ADMIN_TOKEN", "s3cret"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.planner.syllabus_path.as_deref(),
            Some(Path::new("/data/syllabus.json"))
        );
        assert_eq!(config.store.backend, "file");
        assert_eq!(config.store.resolved_path(), PathBuf::from("/data/store.json"));
        assert_eq!(config.gateway.admin_tokens, vec!["s3cret"]);

        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.gateway.admin_tokens.len(), 1);
    }

    #[test]
    fn debug_redacts_admin_tokens() {
        let mut config = AppConfig::default();
        config.gateway.admin_tokens = vec!["top-secret-token".into()];
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn default_toml_generation() {
        let toml = AppConfig::default_toml();
        assert!(toml.contains("[gateway]"));
        assert!(toml.contains("[planner]"));
        assert!(toml.contains("[store]"));
        let parsed: AppConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.store.backend, "memory");
    }
}
