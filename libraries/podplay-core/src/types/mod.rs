//! Domain types

mod favorite;
mod history;
mod ids;

pub use favorite::{sort_most_recent_first, FavoriteDetail, FavoriteItem};
pub use history::{HistoryEntry, ListenItem};
pub use ids::PodcastId;
