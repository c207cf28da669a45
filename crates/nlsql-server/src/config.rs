//! Configuration for the nlsql server
//!
//! Loads configuration from `config.yaml` (or the file named by `NLSQL_CONFIG`).
//! A missing file means defaults. Environment variables always override
//! file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::history::DEFAULT_CAPACITY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnvVar { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where the tables come from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// JSON file of `{ tableName: [rows] }`; the built-in sample when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, or per-module)
    pub level: String,

    /// pretty, json, compact
    pub format: String,

    /// stdout, file, both
    pub output: String,

    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Path named by `NLSQL_CONFIG`, else `config.yaml`
    pub fn default_path() -> PathBuf {
        std::env::var_os("NLSQL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.yaml"))
    }

    /// Load a YAML file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Config::default();
                config.apply_env(|name| std::env::var(name).ok())?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Override fields from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("NLSQL_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("NLSQL_SERVER_PORT") {
            self.server.port = parse_var("NLSQL_SERVER_PORT", port)?;
        }
        if let Some(path) = lookup("NLSQL_DATASET_PATH") {
            self.dataset.path = Some(PathBuf::from(path));
        }
        if let Some(capacity) = lookup("NLSQL_HISTORY_CAPACITY") {
            self.history.capacity = parse_var("NLSQL_HISTORY_CAPACITY", capacity)?;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(output) = lookup("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.logging.directory = dir;
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.addr(), "127.0.0.1:8080");
        assert_eq!(config.dataset.path, None);
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "stdout");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 3000\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.history.capacity, 10);
    }

    #[test]
    fn test_env_var_override() {
        let yaml = r#"
server:
  host: "0.0.0.0"
  port: 8080
dataset:
  path: "data.json"
history:
  capacity: 5
logging:
  level: "info"
  format: "pretty"
  output: "stdout"
  directory: "./logs"
"#;
        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        config
            .apply_env(env(&[
                ("NLSQL_SERVER_PORT", "9090"),
                ("NLSQL_HISTORY_CAPACITY", "20"),
                ("LOG_FORMAT", "json"),
            ]))
            .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.dataset.path, Some(PathBuf::from("data.json")));
        assert_eq!(config.history.capacity, 20);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_port() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("NLSQL_SERVER_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref name, .. } if name == "NLSQL_SERVER_PORT"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("nlsql_test_config.yaml");
        std::fs::write(&path, "history:\n  capacity: 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.history.capacity, 3);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("nlsql_missing_config.yaml");
        std::fs::remove_file(&path).ok();
        assert!(Config::load_or_default(&path).is_ok());
        assert!(matches!(Config::load(&path), Err(ConfigError::Io(_))));
    }
}
