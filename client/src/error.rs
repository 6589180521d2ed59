//! Error types for the gateway client.

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, body read error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Non-success HTTP status on an endpoint that carries no error body.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// Non-success HTTP status with an optional server-supplied message.
    #[error("request rejected with HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected { status: u16, message: Option<String> },

    /// Body could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Bad endpoint configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ClientError {
    /// Whether the failure happened before any response was seen.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// The server-supplied message, when there is one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
