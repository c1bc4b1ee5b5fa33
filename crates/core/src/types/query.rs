//! Product listing queries and their canonical signatures.
//!
//! A [`ProductQuery`] describes one page of the catalog: optional category,
//! search text and sort key, plus offset pagination. Its [`QuerySignature`]
//! is the canonical string used as the listing cache key.
//!
//! # Canonical form
//!
//! ```text
//! category=Shirts&limit=20&page=1&search=oxford&sort=price-asc
//! ```
//!
//! - keys always appear in alphabetical order
//! - absent optional fields are omitted
//! - `page` and `limit` are always present, after defaulting
//! - values are percent-encoded

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use thiserror::Error;

/// Page used when none is requested.
pub const DEFAULT_PAGE: NonZeroU32 = NonZeroU32::MIN;

/// Page size used when none is requested.
pub const DEFAULT_LIMIT: NonZeroU32 = NonZeroU32::new(20).expect("20 is non-zero");

/// Errors produced while building a query from request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{field} must be a positive integer (got {value:?})")]
    InvalidNumber { field: &'static str, value: String },
    #[error("malformed query string: {0}")]
    Malformed(String),
}

/// Canonical cache key for a [`ProductQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuerySignature(String);

impl QuerySignature {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort orders understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Name,
    Newest,
    Discount,
}

impl ProductSort {
    /// Parse a sort key. Unknown keys yield `None` (store order).
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "name" => Some(Self::Name),
            "newest" => Some(Self::Newest),
            "discount" => Some(Self::Discount),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Name => "name",
            Self::Newest => "newest",
            Self::Discount => "discount",
        }
    }
}

/// Filter, sort and pagination parameters for one catalog page.
///
/// Optional text fields are trimmed on the way in; blank values count as
/// absent, so `with_search("  ")` is the same query as no search at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    category: Option<String>,
    search: Option<String>,
    page: NonZeroU32,
    limit: NonZeroU32,
    sort: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: None,
        }
    }
}

impl ProductQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: impl AsRef<str>) -> Self {
        self.category = normalize_text(category.as_ref());
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        self.search = normalize_text(search.as_ref());
        self
    }

    #[must_use]
    pub const fn with_page(mut self, page: NonZeroU32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: NonZeroU32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl AsRef<str>) -> Self {
        self.sort = normalize_text(sort.as_ref());
        self
    }

    /// Build a query from `(key, value)` request parameters.
    ///
    /// Unknown keys are ignored; when a key repeats, the last value wins.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidNumber`] if `page` or `limit` is not a
    /// positive integer.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "category" => query.category = normalize_text(value),
                "search" => query.search = normalize_text(value),
                "sort" => query.sort = normalize_text(value),
                "page" => query.page = parse_positive("page", value)?,
                "limit" => query.limit = parse_positive("limit", value)?,
                _ => {}
            }
        }
        Ok(query)
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub const fn page(&self) -> NonZeroU32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    #[must_use]
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// The sort order, if the key is one the catalog understands.
    #[must_use]
    pub fn sort_order(&self) -> Option<ProductSort> {
        self.sort.as_deref().and_then(ProductSort::parse)
    }

    /// Number of matching products to skip for this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.get() - 1) * u64::from(self.limit.get())
    }

    /// Clamp the page size to `max`, keeping everything else.
    #[must_use]
    pub fn clamp_limit(mut self, max: NonZeroU32) -> Self {
        self.limit = self.limit.min(max);
        self
    }

    /// Parameters for the catalog API request, in canonical key order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("page", self.page.to_string()));
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }

    /// The canonical signature of this query.
    #[must_use]
    pub fn signature(&self) -> QuerySignature {
        let canonical = self
            .to_query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        QuerySignature(canonical)
    }
}

impl FromStr for ProductQuery {
    type Err = QueryError;

    /// Parse a URL query string (with or without a leading `?`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('?').unwrap_or(s);
        let mut pairs = Vec::new();
        for part in s.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            pairs.push((decode_component(key)?, decode_component(value)?));
        }
        Self::from_pairs(pairs)
    }
}

fn decode_component(raw: &str) -> Result<String, QueryError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| QueryError::Malformed(e.to_string()))
}

fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn parse_positive(field: &'static str, value: &str) -> Result<NonZeroU32, QueryError> {
    value
        .trim()
        .parse::<NonZeroU32>()
        .map_err(|_| QueryError::InvalidNumber {
            field,
            value: value.to_owned(),
        })
}
