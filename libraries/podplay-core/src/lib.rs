//! Podplay Core
//!
//! Platform-agnostic core types, key-value store adapters, configuration and
//! error handling for Podplay.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PodcastId`, `FavoriteDetail`, `HistoryEntry`, etc.
//! - **Core Traits**: `KeyValueStore`, the async string-keyed device store
//! - **Store Adapters**: `MemoryStore` (in-process, failure injection) and
//!   `DirectoryStore` (durable, one file per key)
//! - **Configuration**: `AppConfig`, loaded from TOML + environment
//! - **Error Handling**: `CoreError` and `StoreError`
//!
//! # Example
//!
//! ```rust
//! use podplay_core::{KeyValueStore, MemoryStore};
//!
//! # async fn example() -> podplay_core::StoreResult<()> {
//! let store = MemoryStore::new();
//! store.set("@podplay/history/entries", "[]").await?;
//! assert_eq!(store.get("@podplay/history/entries").await?.as_deref(), Some("[]"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{CoreError, Result, StoreError, StoreResult};
pub use store::{keys, DirectoryStore, MemoryStore};
pub use traits::KeyValueStore;

pub use types::{FavoriteDetail, FavoriteItem, HistoryEntry, ListenItem, PodcastId};
