//! Core error types for Podplay
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type alias for key-value store adapters
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Core error type for Podplay
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Errors raised by a key-value store adapter
///
/// The device store is a black box: every operation may fail with a generic
/// I/O error, which is all callers are allowed to rely on.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store refused the operation (unavailable, quota, injected failure)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
