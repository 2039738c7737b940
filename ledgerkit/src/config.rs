use crate::client::{JsonRpcClientConfig, RpcDialect};
use ledgerkit_common::{error::LedgerError, token::TokenRegistry};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

/// Default values for configuration
pub mod defaults {
    pub const RPC_URL: &str = "http://127.0.0.1:8545";
    pub const LOG_LEVEL: &str = "info";

    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    // Validation limits
    pub const MIN_TIMEOUT_SECS: u64 = 1;
    pub const MAX_TIMEOUT_SECS: u64 = 300;
}

/// Configuration validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid RPC url '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("Invalid {field}: {value}s is outside {min}..={max}s")]
    InvalidTimeout {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerkitConfig {
    /// JSON-RPC endpoint of the simulated ledger
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Administrative method namespace
    #[serde(default)]
    pub dialect: RpcDialect,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,

    /// Token table to use instead of the built-in one
    #[serde(default)]
    pub registry_file: Option<PathBuf>,
}

// Default functions for serde
fn default_rpc_url() -> String {
    defaults::RPC_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    defaults::REQUEST_TIMEOUT_SECS
}
fn default_connection_timeout_secs() -> u64 {
    defaults::CONNECTION_TIMEOUT_SECS
}

impl Default for LedgerkitConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            dialect: RpcDialect::default(),
            request_timeout_secs: default_request_timeout_secs(),
            connection_timeout_secs: default_connection_timeout_secs(),
            registry_file: None,
        }
    }
}

impl LedgerkitConfig {
    /// Load from a JSON file; absent fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&json)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.rpc_url).map_err(|e| ConfigError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
                reason: "must be an HTTP or HTTPS URL".to_string(),
            });
        }

        check_timeout("request_timeout_secs", self.request_timeout_secs)?;
        check_timeout("connection_timeout_secs", self.connection_timeout_secs)?;
        Ok(())
    }

    pub fn client_config(&self) -> JsonRpcClientConfig {
        JsonRpcClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connection_timeout: Duration::from_secs(self.connection_timeout_secs),
            dialect: self.dialect,
        }
    }

    /// The configured token table, or the built-in one
    pub fn load_registry(&self) -> Result<TokenRegistry, LedgerError> {
        match &self.registry_file {
            Some(path) => TokenRegistry::from_file(path),
            None => Ok(TokenRegistry::builtin()),
        }
    }
}

fn check_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if !(defaults::MIN_TIMEOUT_SECS..=defaults::MAX_TIMEOUT_SECS).contains(&value) {
        return Err(ConfigError::InvalidTimeout {
            field,
            value,
            min: defaults::MIN_TIMEOUT_SECS,
            max: defaults::MAX_TIMEOUT_SECS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = LedgerkitConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rpc_url, defaults::RPC_URL);
        assert_eq!(config.dialect, RpcDialect::Hardhat);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = LedgerkitConfig {
            rpc_url: "ws://127.0.0.1:8545".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRpcUrl { .. })));

        let config = LedgerkitConfig {
            rpc_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRpcUrl { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_timeouts() {
        let config = LedgerkitConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout { field: "request_timeout_secs", .. })
        ));

        let config = LedgerkitConfig {
            connection_timeout_secs: 301,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout { field: "connection_timeout_secs", .. })
        ));
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "rpc_url": "http://localhost:9545", "dialect": "anvil" }}"#).unwrap();

        let config = LedgerkitConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:9545");
        assert_eq!(config.dialect, RpcDialect::Anvil);
        assert_eq!(config.request_timeout_secs, defaults::REQUEST_TIMEOUT_SECS);
        assert!(config.registry_file.is_none());
    }

    #[test]
    fn test_from_file_errors() {
        assert!(matches!(
            LedgerkitConfig::from_file("/nonexistent/ledgerkit.json"),
            Err(ConfigError::Read { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            LedgerkitConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_client_config() {
        let config = LedgerkitConfig {
            request_timeout_secs: 5,
            connection_timeout_secs: 2,
            dialect: RpcDialect::Anvil,
            ..Default::default()
        };
        let client = config.client_config();
        assert_eq!(client.request_timeout, Duration::from_secs(5));
        assert_eq!(client.connection_timeout, Duration::from_secs(2));
        assert_eq!(client.dialect, RpcDialect::Anvil);
    }

    #[test]
    fn test_load_builtin_registry() {
        let registry = LedgerkitConfig::default().load_registry().unwrap();
        assert!(registry.contains("dai"));
    }
}
