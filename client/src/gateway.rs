//! The gateway seam and its request/response contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use idgate_types::{CustomerGid, PollStatus, SessionPayload, VerificationState};

use crate::error::ClientResult;

/// Session status meaning an existing individual verification already applies.
pub const ALREADY_VERIFIED_INDIVIDUAL: &str = "already_verified_individual";

/// Remote operations the verification workflow depends on.
#[async_trait]
pub trait VerifyGateway: Send + Sync {
    /// Read the customer's current verification flags.
    async fn fetch_state(&self) -> ClientResult<VerificationState>;

    /// Start a hosted verification (form-encoded).
    async fn start(&self, request: &StartRequest) -> ClientResult<StartResponse>;

    /// Older JSON start endpoint, used only when [`start`](Self::start) fails.
    async fn start_legacy(&self, request: &LegacyStartRequest) -> ClientResult<StartResponse>;

    /// Create a verification session from the full form payload.
    ///
    /// Non-success statuses surface as `ClientError::Rejected` carrying the
    /// server's `error`/`message` when present.
    async fn create_session(&self, payload: &SessionPayload) -> ClientResult<SessionResponse>;

    /// Poll the out-of-band verification result.
    async fn check_status(&self, customer: &CustomerGid) -> ClientResult<PollStatus>;
}

/// Form-encoded body of the start endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub customer_gid: String,
    pub mode: String,
    pub return_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nzbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// JSON body of the legacy start endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegacyStartRequest {
    #[serde(rename = "customerId", skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nzbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    pub return_to: String,
}

/// Response of either start endpoint.
///
/// The legacy endpoint has used several spellings for the redirect target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct StartResponse {
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default, rename = "redirectUrl")]
    pub redirect_url_camel: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl StartResponse {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            redirect_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// The first non-empty redirect target, in order of preference.
    pub fn redirect_target(&self) -> Option<&str> {
        [&self.redirect_url, &self.redirect_url_camel, &self.url]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .find(|u| !u.is_empty())
    }
}

/// Response of the session endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionResponse {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            redirect_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn already_verified() -> Self {
        Self {
            status: Some(ALREADY_VERIFIED_INDIVIDUAL.to_string()),
            ..Self::default()
        }
    }

    pub fn is_already_verified_individual(&self) -> bool {
        self.status.as_deref() == Some(ALREADY_VERIFIED_INDIVIDUAL)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_url.as_deref().filter(|u| !u.is_empty())
    }

    /// The most specific server-supplied message.
    pub fn server_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.message.as_deref().filter(|m| !m.is_empty()))
    }
}
