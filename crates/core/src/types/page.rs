//! A page of catalog results.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Number of pages needed to show `total` products at `limit` per page.
///
/// ```rust
/// # use emporium_core::total_pages;
/// # use std::num::NonZeroU32;
/// let limit = NonZeroU32::new(20).unwrap();
/// assert_eq!(total_pages(45, limit), 3);
/// assert_eq!(total_pages(0, limit), 0);
/// ```
#[must_use]
pub fn total_pages(total: u64, limit: NonZeroU32) -> u64 {
    total.div_ceil(u64::from(limit.get()))
}

/// One page of products plus the size of the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub data: Vec<Product>,
    pub total: u64,
    pub total_pages: u64,
}

impl ProductPage {
    /// Build a page, deriving `total_pages` from `total` and the page size.
    #[must_use]
    pub fn new(data: Vec<Product>, total: u64, limit: NonZeroU32) -> Self {
        Self {
            data,
            total,
            total_pages: total_pages(total, limit),
        }
    }

    /// A page with no products and no matches.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            total_pages: 0,
        }
    }

    /// Build a page from a possibly incomplete catalog API response.
    ///
    /// A missing `data` field is an empty result set, not a failure. Missing
    /// counts are derived from what is present.
    #[must_use]
    pub fn from_envelope(envelope: PageEnvelope, limit: NonZeroU32) -> Self {
        let data = envelope.data.unwrap_or_default();
        let total = envelope.total.unwrap_or(data.len() as u64);
        let total_pages = envelope
            .total_pages
            .unwrap_or_else(|| total_pages(total, limit));
        Self {
            data,
            total,
            total_pages,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// The catalog API's success body with every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    #[serde(default)]
    pub data: Option<Vec<Product>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn limit(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(45, limit(20)), 3);
        assert_eq!(total_pages(40, limit(20)), 2);
        assert_eq!(total_pages(1, limit(20)), 1);
        assert_eq!(total_pages(0, limit(20)), 0);
    }

    #[test]
    fn test_wire_names() {
        let page = ProductPage::new(Vec::new(), 45, limit(20));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["total"], 45);
        assert_eq!(value["totalPages"], 3);
        assert!(value["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_envelope_missing_data_is_empty() {
        let envelope: PageEnvelope = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        let page = ProductPage::from_envelope(envelope, limit(20));
        assert!(page.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_envelope_null_data_is_empty() {
        let envelope: PageEnvelope = serde_json::from_str(r#"{"data": null}"#).unwrap();
        let page = ProductPage::from_envelope(envelope, limit(20));
        assert_eq!(page, ProductPage::empty());
    }

    #[test]
    fn test_envelope_derives_total_pages() {
        let envelope: PageEnvelope =
            serde_json::from_str(r#"{"data": [], "total": 45}"#).unwrap();
        let page = ProductPage::from_envelope(envelope, limit(20));
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_envelope_keeps_server_total_pages() {
        let envelope: PageEnvelope =
            serde_json::from_str(r#"{"data": [], "total": 45, "totalPages": 5}"#).unwrap();
        let page = ProductPage::from_envelope(envelope, limit(20));
        assert_eq!(page.total_pages, 5);
    }
}
