//! Catalog product as exchanged with the catalog API.
//!
//! The document store owns the full product record; this is the subset the
//! listing path consumes. Field names follow the catalog API's camelCase JSON.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::apply_discount;

/// A product as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier (`_id` in the document store).
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    /// List price in the shop currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Discount percentage, `0..=100`.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    /// Image URLs, primary image first.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

const fn default_in_stock() -> bool {
    true
}

impl Product {
    /// Create an in-stock product with no discount or images.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            discount: Decimal::ZERO,
            images: Vec::new(),
            in_stock: true,
            category: category.into(),
            created_at: None,
        }
    }

    /// Price after the percentage discount.
    #[must_use]
    pub fn sale_price(&self) -> Decimal {
        apply_discount(self.price, self.discount)
    }

    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount > Decimal::ZERO && self.sale_price() < self.price
    }

    /// The primary image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_document_store_shape() {
        let json = r#"{
            "_id": "65f1a2b3c4d5e6f708192a3b",
            "name": "Oxford Shirt",
            "price": 1299.5,
            "discount": 20,
            "images": ["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.jpg"],
            "inStock": false,
            "category": "Shirts",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "65f1a2b3c4d5e6f708192a3b");
        assert_eq!(product.price, Decimal::new(12995, 1));
        assert_eq!(product.discount, Decimal::from(20));
        assert!(!product.in_stock);
        assert_eq!(product.primary_image(), Some("https://cdn.example.com/a.jpg"));
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let json = r#"{"id": "p1", "name": "Tee", "price": 10, "category": "Shirts"}"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.discount, Decimal::ZERO);
        assert!(product.images.is_empty());
        assert!(product.in_stock);
        assert!(product.created_at.is_none());
        assert!(!product.is_discounted());
    }

    #[test]
    fn test_sale_price() {
        let mut product = Product::new("p1", "Parka", Decimal::from(200), "Jackets");
        product.discount = Decimal::from(25);
        assert_eq!(product.sale_price(), Decimal::from(150));
        assert!(product.is_discounted());
    }

    #[test]
    fn test_serializes_price_as_number() {
        let product = Product::new("p1", "Tee", Decimal::new(1999, 2), "Shirts");
        let value = serde_json::to_value(&product).unwrap();
        assert!(value["price"].is_number());
        assert_eq!(value["_id"], "p1");
        assert_eq!(value["inStock"], true);
    }
}
