//! Persisted key layout
//!
//! Every repository owns one namespace under the app prefix and treats it as
//! exclusively its own. Each value is a JSON array.

/// Prefix shared by every key the app writes
pub const APP_PREFIX: &str = "@podplay";

/// Favorites namespace
pub mod favorites {
    /// `[FavoriteDetail]`, the single source of truth for favorites
    pub const DETAILS: &str = "@podplay/favorites/details";

    /// Legacy `[string | number]` id list written by older versions
    ///
    /// Only read to repair and migrate old installs, never written.
    pub const LEGACY_IDS: &str = "@podplay/favorites/ids";

    /// Every key in the namespace
    pub const ALL: [&str; 2] = [DETAILS, LEGACY_IDS];
}

/// History namespace
pub mod history {
    /// `[HistoryEntry]`, most recent first
    pub const ENTRIES: &str = "@podplay/history/entries";
}

/// Namespace a key belongs to, if it is one of ours
pub fn namespace_of(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(APP_PREFIX)?.strip_prefix('/')?;
    rest.split('/').next().filter(|ns| !ns.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_are_disjoint() {
        for key in favorites::ALL {
            assert_eq!(namespace_of(key), Some("favorites"));
        }
        assert_eq!(namespace_of(history::ENTRIES), Some("history"));
    }

    #[test]
    fn foreign_keys_have_no_namespace() {
        assert_eq!(namespace_of("other/favorites"), None);
        assert_eq!(namespace_of("@podplay"), None);
        assert_eq!(namespace_of("@podplay/"), None);
    }
}
