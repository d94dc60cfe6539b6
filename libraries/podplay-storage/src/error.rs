//! Storage-specific errors
use podplay_core::{PodcastId, StoreError};
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Local store read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Podcast is already a favorite
    #[error("Already a favorite: {0}")]
    AlreadyFavorite(PodcastId),

    /// Another write for the same podcast has not finished yet
    #[error("Write already in flight for {0}")]
    WriteInFlight(PodcastId),
}

impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("Serialization error: {err}"))
    }
}
