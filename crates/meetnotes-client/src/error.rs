//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable session token.
    #[error("authentication required: {0}")]
    AuthRequired(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server answered with an error body.
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    /// The server answered with something unexpected.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid input: {0}")]
    Input(String),
}

impl ClientError {
    /// Status code of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Protocol(format!("unexpected response: {}", err))
        } else {
            Self::Connection(err.to_string())
        }
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("failed to parse config: {}", err))
    }
}
