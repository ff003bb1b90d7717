//! Bridge configuration.
//!
//! Loaded from a TOML file using the standard search order:
//!
//! 1. `$PWS_BRIDGE_CONFIG` environment variable (path to TOML file)
//! 2. `pws_bridge.toml` in the current working directory
//! 3. Built-in defaults
//!
//! CLI flags override file values; the Home Assistant token may also
//! come from the `LLT` environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::station::StationCredentials;

/// Default config file name searched in the working directory.
pub const CONFIG_FILE_NAME: &str = "pws_bridge.toml";

/// Environment variable naming an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "PWS_BRIDGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// What an empty authentication match set means at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPolicy {
    /// Reject the request with 403. The default for a
    /// credential-checking boundary.
    #[default]
    Strict,
    /// Accept the request and do nothing.
    Lenient,
}

/// Root bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Inbound HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Home Assistant endpoint
    #[serde(default)]
    pub home_assistant: HomeAssistantConfig,

    /// Empty-match authentication policy
    #[serde(default)]
    pub auth_policy: AuthPolicy,

    /// Provisioned station id/secret pairs
    #[serde(default)]
    pub stations: Vec<StationCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_listen")]
    pub listen: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_listen() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        8080
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: Self::default_listen(),
            port: Self::default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAssistantConfig {
    #[serde(default = "HomeAssistantConfig::default_host")]
    pub host: String,
    #[serde(default = "HomeAssistantConfig::default_port")]
    pub port: u16,
    #[serde(default)]
    pub use_https: bool,
    /// Long-lived access token. May be omitted here and supplied via
    /// the `LLT` environment variable instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl HomeAssistantConfig {
    fn default_host() -> String {
        "localhost".to_string()
    }

    fn default_port() -> u16 {
        8123
    }
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            use_https: false,
            token: None,
        }
    }
}

impl BridgeConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            info!(path = %path, "Loading config from environment-specified path");
            return Self::from_file(&path);
        }

        if Path::new(CONFIG_FILE_NAME).exists() {
            info!(path = CONFIG_FILE_NAME, "Loading config from working directory");
            return Self::from_file(CONFIG_FILE_NAME);
        }

        info!("No config file found — using built-in defaults");
        Ok(Self::default())
    }

    /// Load configuration from an explicit TOML file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = BridgeConfig::default();
        assert_eq!(config.server.listen, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.home_assistant.port, 8123);
        assert!(!config.home_assistant.use_https);
        assert_eq!(config.auth_policy, AuthPolicy::Strict);
        assert!(config.stations.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let toml_str = r#"
auth_policy = "lenient"

[server]
listen = "0.0.0.0"
port = 9000

[home_assistant]
host = "ha.local"
port = 8443
use_https = true
token = "llt"

[[stations]]
id = "KCASANFR5"
secret = "hunter2"
"#;
        let config: BridgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.home_assistant.host, "ha.local");
        assert!(config.home_assistant.use_https);
        assert_eq!(config.home_assistant.token.as_deref(), Some("llt"));
        assert_eq!(config.auth_policy, AuthPolicy::Lenient);
        assert_eq!(
            config.stations,
            vec![StationCredentials {
                id: "KCASANFR5".to_string(),
                secret: "hunter2".to_string(),
            }]
        );
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() {
        let config: BridgeConfig = toml::from_str("[server]\nport = 8888\n").unwrap();
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.server.listen, "127.0.0.1");
        assert_eq!(config.home_assistant.host, "localhost");
    }
}
