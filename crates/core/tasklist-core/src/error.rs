//! Error types for the task list client

use crate::forms::INVALID_CREDENTIALS_MESSAGE;
use thiserror::Error;

/// A failed call to the auth or task service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The service rejected the bearer token or credentials (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Create a status error, mapping 401 to `Unauthorized`
    pub fn status<S: Into<String>>(status: u16, message: S) -> Self {
        if status == 401 {
            Self::Unauthorized
        } else {
            Self::Status {
                status,
                message: message.into(),
            }
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Check if the service rejected our token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if the service blamed the request (4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Unauthorized => true,
            Self::Status { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}

/// Failures surfaced by the application state, one per user-facing path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskListError {
    /// Login was rejected or could not reach the auth service
    #[error("Login failed: {0}")]
    AuthFailure(#[source] ApiError),

    /// The task list could not be retrieved
    #[error("Failed to fetch tasks: {0}")]
    FetchFailure(#[source] ApiError),

    /// Adding or completing a task failed
    #[error("Failed to update tasks: {0}")]
    MutationFailure(#[source] ApiError),

    /// A task operation was attempted without a bearer token
    #[error("Not logged in")]
    NotAuthenticated,
}

impl TaskListError {
    /// Text suitable for showing to the user.
    ///
    /// Login failures never reveal whether the credentials or the network
    /// were at fault.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthFailure(_) => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::FetchFailure(e) => format!("Could not load tasks: {}", e),
            Self::MutationFailure(e) => format!("Could not save task: {}", e),
            Self::NotAuthenticated => "Please log in first".to_string(),
        }
    }

    /// The underlying service error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::AuthFailure(e) | Self::FetchFailure(e) | Self::MutationFailure(e) => Some(e),
            Self::NotAuthenticated => None,
        }
    }
}
