//! Product listing on the client side of the catalog API.
//!
//! # Architecture
//!
//! - [`CatalogClient`] fetches pages from `GET /api/products` with `reqwest`
//! - [`QueryCache`] maps a query signature to the last page fetched for it
//! - [`ProductListing`] drives both on behalf of a view: cache first, then
//!   network, applying only the newest request's result
//!
//! The cache is an owned value. Build one at start-up, hand clones of it to
//! every listing that should share results, and call [`QueryCache::clear`]
//! on logout or navigation.
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_storefront::listing::{CatalogClient, ProductListing, QueryCache};
//!
//! let client = CatalogClient::new(&config.listing)?;
//! let cache = QueryCache::from_config(&config.listing);
//! let listing = ProductListing::new(client, cache, config.listing.freshness_window);
//!
//! listing.set_query(ProductQuery::new().with_category("Shirts"));
//! let state = listing.settled().await;
//! ```

pub mod cache;
pub mod client;
pub mod controller;

use std::future::Future;

use emporium_core::{ProductPage, ProductQuery};
use thiserror::Error;

pub use cache::{CacheEntry, QueryCache};
pub use client::CatalogClient;
pub use controller::{DEFAULT_FRESHNESS_WINDOW, ListingState, ProductListing};

/// Errors that can occur when fetching a catalog page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The catalog API answered with a non-success status.
    #[error("Catalog API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The success body was not JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured catalog API URL cannot address the products endpoint.
    #[error("Invalid catalog API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Where the listing controller gets pages from.
pub trait CatalogSource: Send + Sync + 'static {
    /// Fetch one page for `query`.
    fn fetch_page(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductPage, FetchError>> + Send;
}
