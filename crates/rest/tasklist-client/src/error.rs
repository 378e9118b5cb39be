//! Error types for the task service client

use tasklist_core::ApiError;
use thiserror::Error;

/// Errors that can occur while talking to the auth or task service
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Server URL could not be used as a base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create a status error
    pub fn status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url<S: Into<String>>(url: S) -> Self {
        Self::InvalidUrl(url.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check if the server rejected the credentials or token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, message } => ApiError::status(status, message),
            ClientError::Http(e) if e.is_decode() => ApiError::decode(e.to_string()),
            ClientError::Http(e) => ApiError::transport(e.to_string()),
            other => ApiError::transport(other.to_string()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;
