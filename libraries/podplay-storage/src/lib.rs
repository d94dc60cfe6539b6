//! Podplay Storage
//!
//! Favorites and listening history persisted over the device key-value store.
//!
//! # Architecture
//!
//! - **Favorites**: one collection of `FavoriteDetail` records is the single
//!   source of truth; the id set is derived from it. Legacy installs that kept
//!   a separate id list are repaired on read.
//! - **History**: bounded, most-recent-first, de-duplicated by id.
//! - **Namespaces**: each repository owns its keys under
//!   [`podplay_core::keys`] and never touches the other's.
//!
//! Read failures fail open (empty/false). Favorite writes propagate
//! [`StorageError::Persistence`]; history writes are logged and swallowed.
//!
//! # Example
//!
//! ```rust
//! use podplay_core::{FavoriteItem, MemoryStore};
//! use podplay_storage::FavoritesRepository;
//! use std::sync::Arc;
//!
//! # async fn example() -> podplay_storage::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let favorites = FavoritesRepository::new(store);
//!
//! let now_favorite = favorites
//!     .toggle_favorite(&FavoriteItem::new("p1", "Ep1", "https://img/1.jpg"))
//!     .await?;
//! assert!(now_favorite);
//! assert!(favorites.is_favorite(&"p1".into()).await);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod favorites;
mod guard;
pub mod history;

pub use error::{Result, StorageError};
pub use favorites::{FavoritesRepository, MigrationReport};
pub use guard::{InFlight, InFlightGuard};
pub use history::{HistoryRepository, DEFAULT_HISTORY_CAPACITY};
