//! Product listing controller.
//!
//! Turns filter/sort/pagination changes into catalog requests on behalf of a
//! view, consulting the [`QueryCache`] first. Every change starts a new
//! generation; only the newest generation may commit a result, and starting
//! one cancels the request of the previous one.
//!
//! ```text
//! set_query(q) ── fresh entry for q.signature()? ──yes──> Loaded (from cache)
//!                        │ no
//!                        v
//!                     Loading ── fetch ──> still newest? ──yes──> cache + Loaded/Empty/Failed
//!                                                 │ no
//!                                                 v
//!                                              discard
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use emporium_core::{ProductPage, ProductQuery, QuerySignature};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::cache::{CacheEntry, QueryCache};
use super::{CatalogSource, FetchError};

/// How long a cached page is served without re-fetching.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// What a view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    /// No query has been issued yet.
    Idle,
    /// A request for `signature` is in flight.
    Loading { signature: QuerySignature },
    /// A page with at least one product.
    Loaded {
        signature: QuerySignature,
        page: Arc<ProductPage>,
        from_cache: bool,
    },
    /// The query succeeded but this page has no products.
    Empty {
        signature: QuerySignature,
        page: Arc<ProductPage>,
        from_cache: bool,
    },
    /// The request failed; nothing from it was applied.
    Failed {
        signature: QuerySignature,
        message: String,
    },
}

impl ListingState {
    fn from_page(signature: QuerySignature, page: Arc<ProductPage>, from_cache: bool) -> Self {
        if page.is_empty() {
            Self::Empty {
                signature,
                page,
                from_cache,
            }
        } else {
            Self::Loaded {
                signature,
                page,
                from_cache,
            }
        }
    }

    /// The signature of the query this state belongs to.
    #[must_use]
    pub const fn signature(&self) -> Option<&QuerySignature> {
        match self {
            Self::Idle => None,
            Self::Loading { signature }
            | Self::Loaded { signature, .. }
            | Self::Empty { signature, .. }
            | Self::Failed { signature, .. } => Some(signature),
        }
    }

    /// The page to render, for `Loaded` and `Empty`.
    #[must_use]
    pub const fn page(&self) -> Option<&Arc<ProductPage>> {
        match self {
            Self::Loaded { page, .. } | Self::Empty { page, .. } => Some(page),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    #[must_use]
    pub const fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Drives product listing for one view.
///
/// Must be used from within a Tokio runtime: fetches run as spawned tasks.
/// Dropping the listing cancels its in-flight request.
pub struct ProductListing<S: CatalogSource> {
    shared: Arc<Shared<S>>,
}

struct Shared<S> {
    source: S,
    cache: QueryCache,
    freshness_window: Duration,
    state: watch::Sender<ListingState>,
    flight: Mutex<Flight>,
}

#[derive(Default)]
struct Flight {
    generation: u64,
    query: Option<ProductQuery>,
    pending: Option<Pending>,
}

struct Pending {
    signature: QuerySignature,
    token: CancellationToken,
}

impl<S: CatalogSource> ProductListing<S> {
    /// Create a listing over `source`, sharing `cache` with other listings.
    #[must_use]
    pub fn new(source: S, cache: QueryCache, freshness_window: Duration) -> Self {
        let (state, _) = watch::channel(ListingState::Idle);
        Self {
            shared: Arc::new(Shared {
                source,
                cache,
                freshness_window,
                state,
                flight: Mutex::new(Flight::default()),
            }),
        }
    }

    /// Show the page for `query`.
    ///
    /// A fresh cached page is applied immediately without a request. A query
    /// identical to the one already in flight is left alone. Anything else
    /// supersedes the in-flight request.
    #[instrument(skip(self, query), fields(signature = %query.signature()))]
    pub fn set_query(&self, query: ProductQuery) {
        let signature = query.signature();
        let mut flight = self.shared.lock_flight();

        if flight
            .pending
            .as_ref()
            .is_some_and(|pending| pending.signature == signature)
        {
            debug!("Identical query already in flight");
            return;
        }

        Shared::issue(&self.shared, &mut flight, query, signature);
    }

    /// Re-issue the current query.
    ///
    /// For recovering from `Failed`. A fresh cached page is still used.
    pub fn retry(&self) {
        let mut flight = self.shared.lock_flight();
        let Some(query) = flight.query.clone() else {
            debug!("Nothing to retry");
            return;
        };
        let signature = query.signature();
        Shared::issue(&self.shared, &mut flight, query, signature);
    }

    /// Cancel the in-flight request; its result will never be applied.
    ///
    /// A listing that was `Loading` goes back to `Idle`. Settled states are
    /// left as they are.
    pub fn teardown(&self) {
        let mut flight = self.shared.lock_flight();
        flight.generation += 1;
        if let Some(pending) = flight.pending.take() {
            debug!(signature = %pending.signature, "Cancelling request on teardown");
            pending.token.cancel();
            self.shared.state.send_replace(ListingState::Idle);
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> ListingState {
        self.shared.state.borrow().clone()
    }

    /// Watch state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.shared.state.subscribe()
    }

    /// Wait until no request is loading, then return the state.
    ///
    /// Returns `Idle` at once for a listing that never issued a query or was
    /// torn down mid-request.
    pub async fn settled(&self) -> ListingState {
        let mut rx = self.subscribe();
        let result = rx.wait_for(|state| !state.is_loading()).await;
        // The sender lives in `self`, so the channel cannot close here.
        result.map_or_else(|_| self.state(), |state| state.clone())
    }

    /// The most recently requested query.
    #[must_use]
    pub fn current_query(&self) -> Option<ProductQuery> {
        self.shared.lock_flight().query.clone()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.shared.lock_flight().pending.is_some()
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.shared.cache
    }
}

impl<S: CatalogSource> Drop for ProductListing<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: CatalogSource> Shared<S> {
    fn lock_flight(&self) -> MutexGuard<'_, Flight> {
        // Flight holds no invariants a panicking holder could break halfway.
        self.flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new generation for `query`. Called with the flight lock held.
    fn issue(
        this: &Arc<Self>,
        flight: &mut Flight,
        query: ProductQuery,
        signature: QuerySignature,
    ) {
        flight.generation += 1;
        let generation = flight.generation;

        if let Some(previous) = flight.pending.take() {
            debug!(superseded = %previous.signature, "Cancelling superseded request");
            previous.token.cancel();
        }
        flight.query = Some(query.clone());

        if let Some(entry) = this.cache.get_fresh(&signature, this.freshness_window) {
            debug!(age_ms = entry.age().as_millis(), "Serving page from cache");
            this.state.send_replace(ListingState::from_page(
                signature,
                Arc::clone(entry.page()),
                true,
            ));
            return;
        }

        let token = CancellationToken::new();
        flight.pending = Some(Pending {
            signature: signature.clone(),
            token: token.clone(),
        });
        this.state.send_replace(ListingState::Loading {
            signature: signature.clone(),
        });

        let shared = Arc::clone(this);
        tokio::spawn(async move {
            shared.fetch(generation, query, signature, token).await;
        });
    }

    async fn fetch(
        &self,
        generation: u64,
        query: ProductQuery,
        signature: QuerySignature,
        token: CancellationToken,
    ) {
        // Dropping the fetch future aborts the underlying HTTP request.
        let result = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(signature = %signature, "Request cancelled");
                return;
            }
            result = self.source.fetch_page(&query) => result,
        };

        self.commit(generation, signature, &token, result);
    }

    fn commit(
        &self,
        generation: u64,
        signature: QuerySignature,
        token: &CancellationToken,
        result: Result<ProductPage, FetchError>,
    ) {
        let mut flight = self.lock_flight();
        if flight.generation != generation || token.is_cancelled() {
            debug!(signature = %signature, "Discarding superseded response");
            return;
        }
        flight.pending = None;

        match result {
            Ok(page) => {
                let page = Arc::new(page);
                self.cache
                    .set(signature.clone(), CacheEntry::new(Arc::clone(&page)));
                self.state
                    .send_replace(ListingState::from_page(signature, page, false));
            }
            Err(error) => {
                warn!(signature = %signature, error = %error, "Product listing request failed");
                self.state.send_replace(ListingState::Failed {
                    signature,
                    message: error.to_string(),
                });
            }
        }
    }
}
