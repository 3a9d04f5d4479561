//! Bridge configuration.
//!
//! All settings come from the process environment. [`BridgeConfig::from_lookup`]
//! reads from any key/value source so tests never touch the real environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llms::providers::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: String, value: String },
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_openai_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_openai_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_openai_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_openai_timeout_secs() -> u64 {
    120
}
fn default_mcp_server_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_mcp_timeout_secs() -> u64 {
    30
}

/// Runtime configuration for the bridge server.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Listen host (`BIND_HOST`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// API key for the language model (`OPENAI_API_KEY`).
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<String>,
    /// `OPENAI_BASE_URL`
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    /// `OPENAI_MODEL`
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// `OPENAI_TEMPERATURE`
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f64,
    /// `OPENAI_ORGANIZATION`
    #[serde(default)]
    pub openai_organization: Option<String>,
    /// `OPENAI_TIMEOUT_SECS`
    #[serde(default = "default_openai_timeout_secs")]
    pub openai_timeout_secs: u64,

    /// Base URL of the execution backend (`MCP_SERVER_URL`).
    #[serde(default = "default_mcp_server_url")]
    pub mcp_server_url: String,
    /// `MCP_TIMEOUT_SECS`
    #[serde(default = "default_mcp_timeout_secs")]
    pub mcp_timeout_secs: u64,

    /// Optional YAML capability catalog (`CAPABILITIES_FILE`).
    #[serde(default)]
    pub capabilities_file: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            openai_temperature: default_openai_temperature(),
            openai_organization: None,
            openai_timeout_secs: default_openai_timeout_secs(),
            mcp_server_url: default_mcp_server_url(),
            mcp_timeout_secs: default_mcp_timeout_secs(),
            capabilities_file: None,
        }
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_temperature", &self.openai_temperature)
            .field("openai_organization", &self.openai_organization)
            .field("openai_timeout_secs", &self.openai_timeout_secs)
            .field("mcp_server_url", &self.mcp_server_url)
            .field("mcp_timeout_secs", &self.mcp_timeout_secs)
            .field("capabilities_file", &self.capabilities_file)
            .finish()
    }
}

impl BridgeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset and empty variables fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("BIND_HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = parse("PORT", &port)?;
        }

        config.openai_api_key = get("OPENAI_API_KEY");
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.openai_base_url = url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(temp) = get("OPENAI_TEMPERATURE") {
            config.openai_temperature = parse("OPENAI_TEMPERATURE", &temp)?;
        }
        config.openai_organization = get("OPENAI_ORGANIZATION");
        if let Some(secs) = get("OPENAI_TIMEOUT_SECS") {
            config.openai_timeout_secs = parse("OPENAI_TIMEOUT_SECS", &secs)?;
        }

        if let Some(url) = get("MCP_SERVER_URL") {
            config.mcp_server_url = url;
        }
        if let Some(secs) = get("MCP_TIMEOUT_SECS") {
            config.mcp_timeout_secs = parse("MCP_TIMEOUT_SECS", &secs)?;
        }

        config.capabilities_file = get("CAPABILITIES_FILE").map(PathBuf::from);

        Ok(config)
    }

    /// `host:port` to bind the HTTP listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = assert_ok!(BridgeConfig::from_lookup(lookup_from(&[])));
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.mcp_server_url, "http://localhost:8080");
        assert_eq!(config.openai_model, "gpt-4");
        assert_eq!(config.openai_temperature, 0.7);
        assert!(config.openai_api_key.is_none());
        assert!(config.capabilities_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = assert_ok!(BridgeConfig::from_lookup(lookup_from(&[
            ("PORT", "9090"),
            ("BIND_HOST", "127.0.0.1"),
            ("OPENAI_API_KEY", "sk-live"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_TEMPERATURE", "0.2"),
            ("OPENAI_ORGANIZATION", "org-1"),
            ("MCP_SERVER_URL", "http://mcp.internal:3000"),
            ("MCP_TIMEOUT_SECS", "5"),
            ("CAPABILITIES_FILE", "/etc/bridge/capabilities.yaml"),
        ])));
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-live"));
        assert_eq!(config.openai_model, "gpt-4o");
        assert_eq!(config.openai_temperature, 0.2);
        assert_eq!(config.openai_organization.as_deref(), Some("org-1"));
        assert_eq!(config.mcp_server_url, "http://mcp.internal:3000");
        assert_eq!(config.mcp_timeout_secs, 5);
        assert_eq!(
            config.capabilities_file,
            Some(PathBuf::from("/etc/bridge/capabilities.yaml"))
        );
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = assert_ok!(BridgeConfig::from_lookup(lookup_from(&[
            ("PORT", ""),
            ("MCP_SERVER_URL", "  "),
        ])));
        assert_eq!(config.port, 8080);
        assert_eq!(config.mcp_server_url, "http://localhost:8080");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = assert_err!(BridgeConfig::from_lookup(lookup_from(&[(
            "PORT", "eighty"
        )])));
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT".to_string(),
                value: "eighty".to_string(),
            }
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = BridgeConfig {
            openai_api_key: Some("sk-live".to_string()),
            ..BridgeConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-live"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_serialized_config_omits_api_key() {
        let config = BridgeConfig {
            openai_api_key: Some("sk-live".to_string()),
            ..BridgeConfig::default()
        };
        let value = serde_json::to_value(&config).unwrap();
        assert!(value.get("openai_api_key").is_none());
        assert_eq!(value["port"], 8080);
    }
}
