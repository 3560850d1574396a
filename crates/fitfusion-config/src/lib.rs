//! Configuration for the FitFusion client toolkit.
//!
//! Configuration is resolved in three layers, later layers winning:
//! 1. Built-in defaults (local dev server on port 8000)
//! 2. A YAML config file (`~/.config/fitfusion/config.yaml`, overridable
//!    via `FITFUSION_CONFIG`)
//! 3. Environment variables (`FITFUSION_API_URL`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "FITFUSION_CONFIG";
pub const API_URL_ENV: &str = "FITFUSION_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the remote FitFusion API, without a trailing slash.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file location (if it exists) and
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit YAML file. Environment overrides
    /// are not applied here so tests can pin exact values.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Resolve the config file path: `FITFUSION_CONFIG` (tilde-expanded)
    /// wins over the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let expanded = shellexpand::tilde(&path);
            return Some(PathBuf::from(expanded.as_ref()));
        }
        dirs::config_dir().map(|dir| dir.join("fitfusion").join("config.yaml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_dev_server() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn loads_base_url_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  base_url: https://fitfusion.example.com").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://fitfusion.example.com");
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api: [not, a, map").unwrap();

        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn env_var_overrides_file_value() {
        std::env::set_var(API_URL_ENV, "https://override.example.com");
        let config = Config::load().unwrap();
        std::env::remove_var(API_URL_ENV);

        assert_eq!(config.api.base_url, "https://override.example.com");
    }

    #[test]
    #[serial]
    fn explicit_config_path_env_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  base_url: https://from-file.example.com").unwrap();

        std::env::set_var(CONFIG_PATH_ENV, file.path());
        std::env::remove_var(API_URL_ENV);
        let path = Config::config_path().unwrap();
        let config = Config::load().unwrap();
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(path, file.path());
        assert_eq!(config.api.base_url, "https://from-file.example.com");
    }
}
