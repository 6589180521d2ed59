//! Workflow configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use idgate_client::GatewayConfig;

use crate::error::VerifyError;
use crate::poll::PollConfig;

/// Configuration for a verification page session.
///
/// Can be loaded from a TOML file via [`IdgateConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdgateConfig {
    /// Link target of the "continue shopping" button after success.
    #[serde(default = "default_restricted_collection_path")]
    pub restricted_collection_path: String,

    /// Log output format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Endpoint locations and HTTP timeouts.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Status polling cadence.
    #[serde(default)]
    pub polling: PollConfig,
}

fn default_restricted_collection_path() -> String {
    "/collections/cream-chargers".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl IdgateConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, VerifyError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| VerifyError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, VerifyError> {
        toml::from_str(s).map_err(|e| VerifyError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, VerifyError> {
        toml::to_string_pretty(self).map_err(|e| VerifyError::Config(e.to_string()))
    }
}

impl Default for IdgateConfig {
    fn default() -> Self {
        Self {
            restricted_collection_path: default_restricted_collection_path(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            gateway: GatewayConfig::default(),
            polling: PollConfig::default(),
        }
    }
}
