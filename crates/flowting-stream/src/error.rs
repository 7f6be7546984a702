use thiserror::Error;

/// Failures of a streaming session.
///
/// `Aborted` never reaches a sink: it only tells the read loop that the
/// caller cancelled. Every other variant is rendered into the `error`
/// callback through its `Display` text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Stream aborted")]
    Aborted,

    /// Non-success HTTP status; carries the response body text.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("No response body")]
    MissingBody,

    #[error("{0}")]
    Transport(String),

    #[error("Invalid UTF-8 in stream: {0}")]
    Decode(String),
}

impl StreamError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, StreamError::Aborted)
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
