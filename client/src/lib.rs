//! HTTP gateway for the identity-verification endpoints.
//!
//! [`VerifyGateway`] is the seam the workflow talks through; [`HttpGateway`]
//! is its `reqwest` implementation. Status mapping lives only in `http.rs`.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;

pub use config::GatewayConfig;
pub use error::{ClientError, ClientResult};
pub use gateway::{
    LegacyStartRequest, SessionResponse, StartRequest, StartResponse, VerifyGateway,
    ALREADY_VERIFIED_INDIVIDUAL,
};
pub use http::{HttpGateway, USER_AGENT};
