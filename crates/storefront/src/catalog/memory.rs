//! In-memory catalog store.

use std::cmp::Reverse;
use std::path::Path;

use emporium_core::{Product, ProductPage, ProductQuery, ProductSort};
use tracing::{debug, info, instrument};

use super::{CatalogStore, CatalogStoreError, StoreFuture};

/// A catalog held entirely in memory.
///
/// Matching rules:
/// - `category`: case-insensitive exact match
/// - `search`: case-insensitive substring of the name or category
/// - `sort`: see [`ProductSort`]; unknown keys keep store order
/// - pagination: skip/limit over the sorted matches
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Vec<Product>,
}

impl MemoryCatalog {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load a catalog from a JSON file holding an array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a product array.
    #[instrument]
    pub async fn from_json_file(path: &Path) -> Result<Self, CatalogStoreError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CatalogStoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let products: Vec<Product> = serde_json::from_slice(&bytes)?;
        info!(count = products.len(), "Loaded catalog seed");
        Ok(Self::new(products))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Run `query` against the catalog.
    #[must_use]
    pub fn search(&self, query: &ProductQuery) -> ProductPage {
        let category = query.category().map(str::to_lowercase);
        let needle = query.search().map(str::to_lowercase);

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| {
                category
                    .as_ref()
                    .is_none_or(|c| p.category.to_lowercase() == *c)
            })
            .filter(|p| {
                needle.as_ref().is_none_or(|n| {
                    p.name.to_lowercase().contains(n.as_str())
                        || p.category.to_lowercase().contains(n.as_str())
                })
            })
            .collect();

        if let Some(order) = query.sort_order() {
            sort_products(&mut matches, order);
        }

        let total = matches.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit().get()).unwrap_or(usize::MAX);

        let data: Vec<Product> = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        debug!(total, returned = data.len(), "Catalog query");
        ProductPage::new(data, total, query.limit())
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for product in &self.products {
            if !seen
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&product.category))
            {
                seen.push(product.category.clone());
            }
        }
        seen
    }
}

impl CatalogStore for MemoryCatalog {
    fn find_products<'a>(&'a self, query: &'a ProductQuery) -> StoreFuture<'a, ProductPage> {
        Box::pin(async move { Ok(self.search(query)) })
    }

    fn categories(&self) -> StoreFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(self.category_names()) })
    }
}

/// Stable sort, so ties keep store order.
fn sort_products(products: &mut [&Product], order: ProductSort) {
    match order {
        ProductSort::PriceAsc => products.sort_by_key(|p| p.sale_price()),
        ProductSort::PriceDesc => products.sort_by_key(|p| Reverse(p.sale_price())),
        ProductSort::Name => products.sort_by_cached_key(|p| p.name.to_lowercase()),
        // Undated products sort last.
        ProductSort::Newest => products.sort_by_key(|p| Reverse(p.created_at)),
        ProductSort::Discount => products.sort_by_key(|p| Reverse(p.discount)),
    }
}
