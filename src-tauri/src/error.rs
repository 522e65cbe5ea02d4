use thiserror::Error;

/// Why an inbound frame or a relayed payload was dropped.
#[derive(Debug, Error)]
pub(crate) enum RelayError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("message has no content")]
    EmptyContent,
}
