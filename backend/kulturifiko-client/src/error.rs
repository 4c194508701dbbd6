use thiserror::Error;

use crate::retry::Retryable;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response carrying the server error envelope
    #[error("Server returned {status} ({code}): {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    /// The server answered `{status: "error", message}`
    #[error("{0}")]
    Rejected(String),

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl Retryable for ClientError {
    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_and_server_errors_retry() {
        assert!(ClientError::Transport("reset".into()).is_retryable());
        assert!(ClientError::Status {
            status: 503,
            code: "INTERNAL_ERROR".into(),
            message: "down".into(),
        }
        .is_retryable());
        assert!(!ClientError::Status {
            status: 401,
            code: "UNAUTHORIZED".into(),
            message: "login".into(),
        }
        .is_retryable());
        assert!(!ClientError::Rejected("not allowed".into()).is_retryable());
        assert!(!ClientError::EmptyComment.is_retryable());
    }
}
