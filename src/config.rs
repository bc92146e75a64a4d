//! Application configuration.
//!
//! One JSON file (`holdline.json` by default) holding the data directory
//! and the HTTP server settings. Missing fields fall back to defaults so a
//! minimal `{"data_dir": "./holdline-data"}` is a complete config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn default_data_dir() -> String {
    "./holdline-data".to_string()
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding roster/hold snapshots and the activity log.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// HTTP server settings.
    #[serde(default)]
    pub http: HttpServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            http: HttpServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Writes this configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        fs::write(path, contents).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holdline.json");
        std::fs::write(&path, r#"{"data_dir": "/var/lib/holdline"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, "/var/lib/holdline");
        assert_eq!(config.http.port, HttpServerConfig::default().port);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holdline.json");

        let mut config = AppConfig::default();
        config.http.port = 9999;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.http.port, 9999);
        assert_eq!(loaded.data_dir, config.data_dir);
    }

    #[test]
    fn test_malformed_config_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holdline.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            AppConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }
}
