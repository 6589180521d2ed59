//! `reqwest` implementation of [`VerifyGateway`].
//!
//! This is the only place that interprets HTTP status codes.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use idgate_types::{CustomerGid, PollStatus, SessionPayload, VerificationState};

use crate::config::GatewayConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{LegacyStartRequest, SessionResponse, StartRequest, StartResponse, VerifyGateway};

pub const USER_AGENT: &str = concat!("idgate/", env!("CARGO_PKG_VERSION"));

#[derive(serde::Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: Option<String>,
}

/// HTTP client for the verification endpoints.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> ClientResult<Self> {
        // Fail early on unusable endpoint configuration.
        config.state_url()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Config {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ClientError::Network {
                message: format!("request failed: {e}"),
            })
    }

    /// Require a 2xx status and decode the JSON body.
    async fn json_ok<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(|e| ClientError::InvalidResponse {
            message: format!("invalid JSON response: {e}"),
        })
    }
}

#[async_trait]
impl VerifyGateway for HttpGateway {
    async fn fetch_state(&self) -> ClientResult<VerificationState> {
        let url = self.config.state_url()?;
        debug!(%url, "fetching verification state");
        let response = self.send(self.http.get(url)).await?;
        Self::json_ok(response).await
    }

    async fn start(&self, request: &StartRequest) -> ClientResult<StartResponse> {
        let url = self.config.start_url()?;
        debug!(%url, mode = %request.mode, "starting verification");
        let response = self.send(self.http.post(url).form(request)).await?;
        Self::json_ok(response).await
    }

    async fn start_legacy(&self, request: &LegacyStartRequest) -> ClientResult<StartResponse> {
        let url = self.config.legacy_start_url()?;
        debug!(%url, "starting verification via legacy endpoint");
        let response = self.send(self.http.post(url).json(request)).await?;
        Self::json_ok(response).await
    }

    async fn create_session(&self, payload: &SessionPayload) -> ClientResult<SessionResponse> {
        let url = self.config.session_url()?;
        debug!(%url, customer = %payload.customer_reference, "creating verification session");
        let response = self.send(self.http.post(url).json(payload)).await?;
        let status = response.status();

        // An unreadable body is treated as empty so the status still decides.
        let body: SessionResponse = match response.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "failed to read session response body");
                SessionResponse::default()
            }
        };

        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: body.server_message().map(str::to_string),
            });
        }
        Ok(body)
    }

    async fn check_status(&self, customer: &CustomerGid) -> ClientResult<PollStatus> {
        let url = self.config.status_url()?;
        let request = self.http.get(url).query(&[("customer_id", customer.as_str())]);
        let response = self.send(request).await?;
        let body: StatusBody = Self::json_ok(response).await?;
        Ok(PollStatus::parse(body.status.as_deref()))
    }
}
