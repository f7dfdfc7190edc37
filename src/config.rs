//! Application Configuration
//!
//! This module provides configuration management for the application.
//! Settings come from an optional YAML file with sensible defaults, then
//! environment variables are laid on top. An empty variable counts as unset.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use log::{info, warn};
use thiserror::Error;

use crate::storage::config::{backend_for, DatabaseConfig};
use crate::storage::StorageBackend;

/// Default location of the YAML configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// PostgreSQL settings. `None` keeps todos in memory.
    pub database: Option<DatabaseConfig>,
    /// Values surfaced on the rendered page
    pub presentation: PresentationConfig,
    /// Backend warmup configuration
    pub warmup: WarmupConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: 4,
        }
    }
}

/// Render context handed to the todo page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PresentationConfig {
    /// Enterprise feature flag
    pub enterprise: bool,
    /// Version label, also printed at startup
    pub version: String,
}

/// Backend warmup configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarmupConfig {
    /// Initialization attempts before giving up
    pub max_attempts: u32,
    /// Delay between attempts in seconds
    pub retry_interval_secs: u64,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            max_attempts: 61,
            retry_interval_secs: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from `CONFIG_FILE` (or `config.yaml`) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |key: &str| env::var(key).ok();
        let path = first_set(&lookup, &["CONFIG_FILE"])
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Load configuration from file, use defaults if not found
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let config: AppConfig = serde_yaml::from_str(&content)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Overlay values from `lookup`, a view of the environment.
    ///
    /// Paired variables are tried in order and the first non-empty one wins.
    /// A database host, from either source, selects the PostgreSQL backend.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = first_set(&lookup, &["DB_HOST", "PGHOST"]);
        let mut database = self
            .database
            .take()
            .or_else(|| host.as_ref().map(|_| DatabaseConfig::default()));

        if let Some(db) = database.as_mut() {
            if let Some(host) = host {
                db.host = host;
            }
            if let Some(user) = first_set(&lookup, &["DB_USER", "PGUSER"]) {
                db.user = user;
            }
            if let Some(password) = first_set(&lookup, &["DB_PASSWORD", "PGPASSWORD"]) {
                db.password = password;
            }
            if let Some(ssl_mode) = first_set(&lookup, &["DB_SSL_MODE", "PGSSLMODE"]) {
                db.ssl_mode = ssl_mode;
            }
            if let Some(name) = first_set(&lookup, &["DB_NAME", "DBNAME"]) {
                db.name = name;
            }
        }
        // a file-provided section without a host cannot reach anything
        self.database = database.filter(|db| !db.host.is_empty());

        if let Some(enterprise) = first_set(&lookup, &["ENTERPRISE"]) {
            self.presentation.enterprise = !enterprise.is_empty();
        }
        if let Some(version) = first_set(&lookup, &["VERSION"]) {
            self.presentation.version = version;
        }
        if let Some(host) = first_set(&lookup, &["HOST"]) {
            self.server.host = host;
        }
        if let Some(port) = parse_set(&lookup, "PORT")? {
            self.server.port = port;
        }
        if let Some(attempts) = parse_set(&lookup, "WARMUP_MAX_ATTEMPTS")? {
            self.warmup.max_attempts = attempts;
        }
        if let Some(secs) = parse_set(&lookup, "WARMUP_RETRY_INTERVAL_SECS")? {
            self.warmup.retry_interval_secs = secs;
        }
        Ok(())
    }

    /// Backend selected by this configuration
    pub fn storage_backend(&self) -> StorageBackend {
        backend_for(self.database.as_ref())
    }
}

fn first_set<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}

fn parse_set<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match first_set(lookup, &[key]) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_select_memory_backend() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[])).unwrap();

        assert_eq!(config.storage_backend(), StorageBackend::Memory);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.warmup.max_attempts, 61);
        assert_eq!(config.warmup.retry_interval_secs, 1);
        assert!(!config.presentation.enterprise);
        assert_eq!(config.presentation.version, "");
    }

    #[test]
    fn test_database_host_selects_postgres_with_defaults() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[("PGHOST", "db")])).unwrap();

        assert_eq!(config.storage_backend(), StorageBackend::Postgres);
        let db = config.database.unwrap();
        assert_eq!(db.host, "db");
        assert_eq!(db.user, "postgres");
        assert_eq!(db.ssl_mode, "require");
        assert_eq!(db.name, "mydb");
    }

    #[test]
    fn test_first_variable_of_each_pair_wins() {
        let mut config = AppConfig::default();
        config
            .apply_env(env_of(&[
                ("DB_HOST", "primary"),
                ("PGHOST", "fallback"),
                ("DB_USER", ""),
                ("PGUSER", "pguser"),
                ("DB_PASSWORD", "one"),
                ("PGPASSWORD", "two"),
                ("PGSSLMODE", "disable"),
                ("DBNAME", "todos"),
            ]))
            .unwrap();

        let db = config.database.unwrap();
        assert_eq!(db.host, "primary");
        assert_eq!(db.user, "pguser");
        assert_eq!(db.password, "one");
        assert_eq!(db.ssl_mode, "disable");
        assert_eq!(db.name, "todos");
    }

    #[test]
    fn test_empty_host_keeps_memory_backend() {
        let mut config = AppConfig::default();
        config
            .apply_env(env_of(&[("DB_HOST", ""), ("DB_USER", "someone")]))
            .unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_presentation_and_server_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env_of(&[
                ("ENTERPRISE", "true"),
                ("VERSION", "v1.2.3"),
                ("PORT", "3000"),
                ("WARMUP_MAX_ATTEMPTS", "5"),
                ("WARMUP_RETRY_INTERVAL_SECS", "2"),
            ]))
            .unwrap();

        assert!(config.presentation.enterprise);
        assert_eq!(config.presentation.version, "v1.2.3");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.warmup.max_attempts, 5);
        assert_eq!(config.warmup.retry_interval_secs, 2);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env_of(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_yaml_file_with_env_overlay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9000\ndatabase:\n  host: yaml-db\n  name: fromfile\npresentation:\n  version: yaml"
        )
        .unwrap();

        let mut config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.workers, 4);

        config.apply_env(env_of(&[("DB_NAME", "fromenv")])).unwrap();
        let db = config.database.clone().unwrap();
        assert_eq!(db.host, "yaml-db");
        assert_eq!(db.name, "fromenv");
        assert_eq!(db.user, "postgres");
        assert_eq!(config.presentation.version, "yaml");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map]").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    #[serial]
    fn test_load_from_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        env::set_var("CONFIG_FILE", dir.path().join("none.yaml"));
        env::set_var("DB_HOST", "env-db");
        env::set_var("VERSION", "from-env");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::Postgres);
        assert_eq!(config.presentation.version, "from-env");

        env::remove_var("CONFIG_FILE");
        env::remove_var("DB_HOST");
        env::remove_var("VERSION");
    }
}
