//! Error types for the Podplay API client.

use thiserror::Error;

/// Errors that can occur when talking to the podcast API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure: connection refused, DNS, TLS, timeout
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server rejected the stored token; the session has been invalidated
    #[error("Session expired")]
    SessionExpired,

    /// Login rejected
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Endpoint needs a token but none is stored
    #[error("Authentication required")]
    AuthRequired,

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid API base URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Invalid client configuration (e.g. a malformed auth header name)
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the user has to sign in again
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::AuthRequired)
    }
}

/// Result type for API client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
