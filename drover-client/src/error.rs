//! Error types for remote task clients

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to a task scheduling service
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Task does not exist
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Backend refused the request as invalid (e.g. task already gone)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Response that does not come from the task API (e.g. wrong base URL)
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend command could not be run or exited abnormally
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if the backend declared the request itself invalid
    ///
    /// Stopping a task that is already stopped or gone lands here. These are
    /// routine during teardown, unlike transport or server failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_)) || self.is_client_error() || self.is_not_found()
    }
}
