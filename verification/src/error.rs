use thiserror::Error;

use idgate_client::ClientError;
use idgate_types::TypesError;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing customer context")]
    MissingCustomer,

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
