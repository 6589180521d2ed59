//! Structured logging initialisation via `tracing`.
//!
//! Logs go to stderr. Two output formats are supported:
//! - [`LogFormat::Human`]: readable lines for local use.
//! - [`LogFormat::Json`]: newline-delimited JSON for log aggregation.
//!
//! The filter can be overridden at runtime via `RUST_LOG`. When it is not
//! set, the caller-supplied `level` string is used (e.g. `"info"`,
//! `"debug,idgate_verification=trace"`).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log format {0:?}, expected \"human\" or \"json\"")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Human => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }
}
