use frames_core::types::FramesError;
use thiserror::Error;

/// Errors surfaced by the transport adapter.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with a non-success status; `body` is its text verbatim.
    #[error("cannot call API ({status}) - {body}")]
    TransportFailure { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Frames(#[from] FramesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid client config: {0}")]
    Config(String),
}
