//! Catalog store behind the catalog API.
//!
//! The document store is an external collaborator: the API only needs it to
//! answer one question, "which products match this query, and how many are
//! there in total". [`CatalogStore`] is that seam. [`MemoryCatalog`] is the
//! in-process implementation used for local runs, seeding and tests.

mod memory;

use std::future::Future;
use std::pin::Pin;

use emporium_core::{ProductPage, ProductQuery};
use thiserror::Error;

pub use memory::MemoryCatalog;

/// Boxed future returned by [`CatalogStore`] methods.
pub type StoreFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, CatalogStoreError>> + Send + 'a>>;

/// Errors raised by a catalog store.
#[derive(Debug, Error)]
pub enum CatalogStoreError {
    /// Reading the seed file failed.
    #[error("Failed to read catalog seed {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The seed file is not a JSON array of products.
    #[error("Invalid catalog seed: {0}")]
    InvalidSeed(#[from] serde_json::Error),

    /// The backing store could not answer the query.
    #[error("Catalog store unavailable: {0}")]
    Unavailable(String),
}

/// A queryable product catalog.
pub trait CatalogStore: Send + Sync + 'static {
    /// Find one page of products matching `query`, with the total match count.
    fn find_products<'a>(&'a self, query: &'a ProductQuery) -> StoreFuture<'a, ProductPage>;

    /// Distinct product categories, in first-seen order.
    fn categories(&self) -> StoreFuture<'_, Vec<String>>;
}
