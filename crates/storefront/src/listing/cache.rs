//! Client-side cache of product pages, keyed by query signature.
//!
//! Entries are never expired by the cache itself: `get` hands back whatever
//! was stored last for a signature, and the caller decides whether it is
//! still fresh using [`CacheEntry::is_fresh`]. An entry is overwritten by the
//! next successful fetch for the same signature and otherwise lives until
//! [`QueryCache::clear`] or the cache is dropped.
//!
//! Capture times come from `tokio::time`, so tests can pause and advance the
//! clock.

use std::sync::Arc;
use std::time::Duration;

use emporium_core::{Product, ProductPage, QuerySignature};
use moka::sync::Cache;
use tokio::time::Instant;

use crate::config::ListingConfig;

/// One cached page and when it was captured.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    page: Arc<ProductPage>,
    captured_at: Instant,
}

impl CacheEntry {
    /// Capture `page` now.
    #[must_use]
    pub fn new(page: Arc<ProductPage>) -> Self {
        Self {
            page,
            captured_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn page(&self) -> &Arc<ProductPage> {
        &self.page
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.page.data
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.page.total
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.page.total_pages
    }

    #[must_use]
    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }

    /// Whether the entry may still be served without re-fetching.
    ///
    /// An entry exactly `window` old is already stale.
    #[must_use]
    pub fn is_fresh(&self, window: Duration) -> bool {
        self.age() < window
    }
}

/// Signature-keyed page cache shared by product listings.
///
/// Cloning is cheap and clones share entries. Unbounded unless built with
/// [`QueryCache::with_max_entries`].
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<QuerySignature, Arc<CacheEntry>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    /// Create an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Create a cache holding at most `max_entries` pages.
    ///
    /// Past the bound, moka evicts by its usage-frequency policy.
    #[must_use]
    pub fn with_max_entries(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Create a cache as described by listing configuration.
    #[must_use]
    pub fn from_config(config: &ListingConfig) -> Self {
        config
            .cache_max_entries
            .map_or_else(Self::new, Self::with_max_entries)
    }

    /// The entry stored for `signature`, however old.
    #[must_use]
    pub fn get(&self, signature: &QuerySignature) -> Option<Arc<CacheEntry>> {
        self.entries.get(signature)
    }

    /// The entry stored for `signature`, if younger than `window`.
    #[must_use]
    pub fn get_fresh(
        &self,
        signature: &QuerySignature,
        window: Duration,
    ) -> Option<Arc<CacheEntry>> {
        self.get(signature).filter(|entry| entry.is_fresh(window))
    }

    /// Store `entry` for `signature`, replacing any previous entry.
    pub fn set(&self, signature: QuerySignature, entry: CacheEntry) {
        self.entries.insert(signature, Arc::new(entry));
    }

    #[must_use]
    pub fn contains(&self, signature: &QuerySignature) -> bool {
        self.entries.contains_key(signature)
    }

    /// Drop every entry (logout, navigation away from the catalog).
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of stored entries, after applying pending maintenance.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
