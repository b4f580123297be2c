use thiserror::Error;

/// Why a single feed fetch produced no usable payload.
///
/// Never fatal: the poll loop logs the error and keeps the previous value of
/// the affected snapshot slice.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
