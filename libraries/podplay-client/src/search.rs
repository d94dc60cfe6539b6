//! Debounced type-ahead search.
//!
//! Every keystroke calls [`SearchGate::run`]. Each call takes a new generation,
//! waits out the quiet period and only then hits the network. A call that has
//! been overtaken by a newer one (during the wait or while its request is in
//! flight) resolves to `None`, so results can never arrive out of order. The
//! superseded request itself is not cancelled, only its result discarded.

use crate::client::PodcastClient;
use crate::error::Result;
use crate::types::{Page, Podcast};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Default quiet period before a search is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Latest-wins gate for search requests.
///
/// Cheap to clone; clones share the same generation counter.
#[derive(Debug, Clone)]
pub struct SearchGate {
    latest: Arc<AtomicU64>,
    debounce: Duration,
}

impl Default for SearchGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchGate {
    pub fn new(debounce: Duration) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Run `request` after the quiet period unless a newer call supersedes it.
    ///
    /// # Returns
    /// * `Some(output)` - this was still the latest call when `request` finished
    /// * `None` - a newer call was made
    pub async fn run<F, Fut, T>(&self, request: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if self.is_superseded(generation) {
            trace!(generation, "Search superseded before sending");
            return None;
        }

        let output = request().await;
        if self.is_superseded(generation) {
            debug!(generation, "Discarding superseded search result");
            return None;
        }

        Some(output)
    }

    /// Debounced `search_podcasts`.
    pub async fn search(
        &self,
        client: &PodcastClient,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Option<Result<Page<Podcast>>> {
        self.run(|| client.search_podcasts(query, page, limit))
            .await
    }

    /// Supersede any pending call, e.g. when the search box is cleared.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != generation
    }
}
