//! Configuration file support for netrd-explorer
//!
//! Settings are read from `.netrd-explorer.toml` (or `netrd-explorer.toml`),
//! searched for in the working directory and its parents. Command-line flags
//! override anything set here.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .netrd-explorer.toml
//!
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//! # Open the explorer page in a browser on startup
//! open_browser = false
//!
//! [limits]
//! # Graphs generated before giving up on a connected one
//! max_generation_attempts = 100
//! # Largest `len` accepted by /time
//! max_time_steps = 10000
//! # Largest graph accepted or generated by any endpoint
//! max_nodes = 500
//!
//! [defaults]
//! # Seed used when a request carries none; omit for fresh entropy
//! seed = 42
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub open_browser: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open_browser: false,
        }
    }
}

/// `[limits]` section: bounds on per-request work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: usize,

    #[serde(default = "default_max_time_steps")]
    pub max_time_steps: usize,

    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_generation_attempts() -> usize {
    100
}

fn default_max_time_steps() -> usize {
    10_000
}

fn default_max_nodes() -> usize {
    500
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_generation_attempts: default_max_generation_attempts(),
            max_time_steps: default_max_time_steps(),
            max_nodes: default_max_nodes(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// `[defaults]` section
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl ExplorerConfig {
    /// Rejects limits that would make every request fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_generation_attempts == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_generation_attempts must be at least 1".to_string(),
            ));
        }
        if self.limits.max_time_steps == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_time_steps must be at least 1".to_string(),
            ));
        }
        if self.limits.max_nodes == 0 {
            return Err(ConfigError::Invalid("limits.max_nodes must be at least 1".to_string()));
        }
        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_body_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration starting from `start_path`
///
/// Searches for `.netrd-explorer.toml` in the given directory and parent
/// directories; built-in defaults apply when none is found.
pub fn load_config(start_path: &Path) -> Result<ExplorerConfig, ConfigError> {
    match find_config_file(start_path) {
        Some(path) => load_config_file(&path),
        None => Ok(ExplorerConfig::default()),
    }
}

/// Load and validate a specific configuration file
pub fn load_config_file(path: &Path) -> Result<ExplorerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ExplorerConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Find the config file by searching up the directory tree
fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".netrd-explorer.toml", "netrd-explorer.toml"];

    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert!(!config.server.open_browser);
        assert_eq!(config.limits.max_generation_attempts, 100);
        assert_eq!(config.limits.max_time_steps, 10_000);
        assert_eq!(config.limits.max_body_bytes, 64 * 1024 * 1024);
        assert_eq!(config.defaults.seed, None);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [server]
            port = 8080

            [limits]
            max_time_steps = 500

            [defaults]
            seed = 7
        "#;

        let config: ExplorerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_time_steps, 500);
        assert_eq!(config.limits.max_nodes, 500);
        assert_eq!(config.defaults.seed, Some(7));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config: ExplorerConfig = toml::from_str("[limits]\nmax_nodes = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        let config: ExplorerConfig = toml::from_str("[limits]\nmax_body_bytes = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".netrd-explorer.toml");
        fs::write(&path, "[server]\nport = \"high\"\n").unwrap();
        assert!(matches!(load_config_file(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_found_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("netrd-explorer.toml"), "[server]\nport = 6001\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested).unwrap();
        assert_eq!(config.server.port, 6001);
    }

    #[test]
    fn test_hidden_name_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".netrd-explorer.toml"), "[server]\nport = 7001\n").unwrap();
        fs::write(dir.path().join("netrd-explorer.toml"), "[server]\nport = 7002\n").unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.server.port, 7001);
    }
}
