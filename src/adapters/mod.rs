use thiserror::Error;

use crate::endpoint::EndpointError;

pub(crate) mod envelope;
pub(crate) mod tabular;
pub(crate) mod text;

/// Why an invocation was not relayed.
///
/// Validation failures are detected before any endpoint call is made;
/// everything else happened while encoding the payload or talking to the
/// endpoint.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("Failed to encode endpoint payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}
