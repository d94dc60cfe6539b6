//! Core traits for Podplay
use crate::error::StoreResult;
use async_trait::async_trait;

/// Device-local key-value store
///
/// Async get/set/remove by string key over a durable, app-scoped store.
/// Values are opaque strings; repositories store JSON in them.
///
/// Implementations must be shareable across tasks. Each repository owns a
/// disjoint key namespace (see [`crate::store::keys`]) and never touches keys
/// outside of it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove a key; removing an absent key is not an error
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Remove several keys
    ///
    /// The default implementation removes them one by one and stops at the
    /// first failure.
    async fn multi_remove(&self, keys: &[&str]) -> StoreResult<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> StoreResult<()> {
        (**self).multi_remove(keys).await
    }
}
