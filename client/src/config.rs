//! Endpoint configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Where the verification endpoints live.
///
/// Paths are resolved against `base_url`. Proxy-hosted endpoints default to
/// paths under `proxy_base` unless set explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Storefront origin, e.g. `https://shop.example`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_proxy_base")]
    pub proxy_base: String,

    #[serde(default = "default_state_path")]
    pub state_path: String,

    #[serde(default = "default_start_path")]
    pub start_path: String,

    #[serde(default)]
    pub legacy_start_path: Option<String>,

    #[serde(default)]
    pub session_path: Option<String>,

    #[serde(default)]
    pub status_path: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_base_url() -> String {
    "http://127.0.0.1:9292".to_string()
}

fn default_proxy_base() -> String {
    "/apps/verification-gateway".to_string()
}

fn default_state_path() -> String {
    "/apps/verify/page".to_string()
}

fn default_start_path() -> String {
    "/apps/verify/start".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GatewayConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn proxied(&self, explicit: Option<&str>, suffix: &str) -> String {
        match explicit {
            Some(path) => path.to_string(),
            None => format!("{}{suffix}", self.proxy_base.trim_end_matches('/')),
        }
    }

    fn resolve(&self, path: &str) -> ClientResult<Url> {
        let base = Url::parse(&self.base_url).map_err(|e| ClientError::Config {
            message: format!("invalid base url {:?}: {e}", self.base_url),
        })?;
        base.join(path).map_err(|e| ClientError::Config {
            message: format!("invalid endpoint path {path:?}: {e}"),
        })
    }

    pub fn state_url(&self) -> ClientResult<Url> {
        self.resolve(&self.state_path)
    }

    pub fn start_url(&self) -> ClientResult<Url> {
        self.resolve(&self.start_path)
    }

    pub fn legacy_start_url(&self) -> ClientResult<Url> {
        self.resolve(&self.proxied(self.legacy_start_path.as_deref(), "/api/identity/start"))
    }

    pub fn session_url(&self) -> ClientResult<Url> {
        self.resolve(&self.proxied(self.session_path.as_deref(), "/api/identity/session"))
    }

    pub fn status_url(&self) -> ClientResult<Url> {
        self.resolve(&self.proxied(self.status_path.as_deref(), "/api/identity/status"))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy_base: default_proxy_base(),
            state_path: default_state_path(),
            start_path: default_start_path(),
            legacy_start_path: None,
            session_path: None,
            status_path: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}
