//! Configuration management for Kinship.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `kinship.toml` file
//! 3. User config `~/.config/kinship/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record store configuration.
    pub storage: StorageConfig,

    /// HTTP API configuration.
    pub server: ServerConfig,

    /// Edge validation configuration.
    pub guard: GuardConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./kinship.toml` (project local)
    /// 2. `~/.config/kinship/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides apply in every case.
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(LOCAL_CONFIG_FILE).exists() {
            return Self::from_file(LOCAL_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        // Storage overrides
        if let Some(backend) = lookup("KINSHIP_STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("KINSHIP_DATA_DIR") {
            self.storage.data_dir = dir;
        }

        // Server overrides
        if let Some(host) = lookup("KINSHIP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("KINSHIP_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("KINSHIP_PORT={}", port)))?;
        }

        // Guard overrides
        if let Some(flag) = lookup("KINSHIP_DETECT_CYCLES") {
            self.guard.detect_cycles = flag
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("KINSHIP_DETECT_CYCLES={}", flag)))?;
        }

        // Logging overrides
        if let Some(filter) = lookup("KINSHIP_LOG") {
            self.logging.filter = filter;
        }

        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Which record store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Non-persistent, in-process map.
    Memory,
    /// Embedded SurrealDB on RocksDB.
    Surreal,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "surreal" | "surrealdb" => Ok(StorageBackend::Surreal),
            other => Err(ConfigError::Invalid(format!("unknown storage backend: {}", other))),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store implementation.
    pub backend: StorageBackend,

    /// Base directory for kinship data (default: ".kinship").
    pub data_dir: String,

    /// Database directory name inside `data_dir`.
    pub db_dir: String,

    /// SurrealDB namespace.
    pub namespace: String,

    /// SurrealDB database.
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_STORAGE_BACKEND
                .parse()
                .unwrap_or(StorageBackend::Surreal),
            data_dir: DEFAULT_DATA_DIR.to_string(),
            db_dir: DEFAULT_DB_DIR.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Get the full path to the database directory.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.db_dir)
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` form accepted by socket binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Edge validation configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Walk the candidate parent's ancestors and reject the edge if the
    /// candidate child is among them. When off, only the order comparison
    /// protects against cycles.
    pub detect_cycles: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            detect_cycles: DEFAULT_DETECT_CYCLES,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.backend, StorageBackend::Surreal);
        assert_eq!(config.storage.data_dir, DEFAULT_DATA_DIR);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.guard.detect_cycles);
    }

    #[test]
    fn test_database_path() {
        let config = StorageConfig {
            data_dir: "/tmp/kin".to_string(),
            ..StorageConfig::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/kin/graph.db"));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("KINSHIP_STORAGE_BACKEND", "memory"),
            ("KINSHIP_PORT", "8081"),
            ("KINSHIP_DETECT_CYCLES", "false"),
            ("KINSHIP_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.server.port, 8081);
        assert!(!config.guard.detect_cycles);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.server.host, DEFAULT_HOST);
    }

    #[test]
    fn test_invalid_override_is_reported() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "KINSHIP_PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
