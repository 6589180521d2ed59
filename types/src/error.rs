//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while parsing or resolving shared types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("unknown customer type: {0}")]
    UnknownCustomerType(String),

    #[error("invalid customer reference: {0}")]
    InvalidCustomerGid(String),

    #[error("missing customer context")]
    MissingCustomer,

    #[error("invalid page address: {0}")]
    InvalidLocation(String),
}
