//! Core catalog types for Emporium.
//!
//! This module provides type-safe wrappers for the catalog listing path:
//! products, prices, listing queries and result pages.

pub mod id;
pub mod page;
pub mod price;
pub mod product;
pub mod query;

pub use id::ProductId;
pub use page::{PageEnvelope, ProductPage, total_pages};
pub use price::apply_discount;
pub use product::Product;
pub use query::{
    DEFAULT_LIMIT, DEFAULT_PAGE, ProductQuery, ProductSort, QueryError, QuerySignature,
};
