//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # Catalog API (rate limited per client IP)
//! GET  /api/products           - One page of products (category, search, page, limit, sort)
//! GET  /api/categories         - Distinct product categories
//! ```

pub mod products;

use axum::{Router, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create the catalog API router (mounted under `/api`).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/categories", get(products::categories))
        .fallback(not_found)
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
