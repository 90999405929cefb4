//! API error type

use thiserror::Error;

/// Failure of a board API call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with `success: false`
    #[error("{message} ({code})")]
    Rejected { message: String, code: String },

    /// The response body did not match the envelope
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("board {0} not found")]
    MissingBoard(String),
}

impl ApiError {
    pub fn code(&self) -> &str {
        match self {
            ApiError::Transport(_) => "TRANSPORT",
            ApiError::Rejected { code, .. } => code,
            ApiError::Decode(_) => "DECODE",
            ApiError::MissingBoard(_) => "NOT_FOUND",
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
