use thiserror::Error;

/// Errors raised while turning a payload into table rows or moving frames around.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed JSON payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// True for failures caused by the payload itself rather than the plumbing.
    pub fn is_payload_error(&self) -> bool {
        matches!(self, RenderError::Parse(_) | RenderError::InvalidTimestamp(_))
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
