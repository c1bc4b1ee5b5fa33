//! Catalog API handlers.
//!
//! `GET /api/products` answers with one page of products:
//!
//! ```json
//! { "data": [ ... ], "total": 45, "totalPages": 3 }
//! ```

use axum::{
    Json,
    extract::{Query, State},
};
use emporium_core::{ProductPage, ProductQuery};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// List one page of products.
///
/// Accepts `category`, `search`, `page`, `limit` and `sort`. `limit` is capped
/// at the configured maximum page size.
///
/// # Errors
///
/// Returns 400 for a non-positive `page`/`limit` and 500 if the store fails.
#[instrument(skip(state, params))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ProductPage>> {
    let query = ProductQuery::from_pairs(params)?
        .clamp_limit(state.config().catalog.max_page_size);

    add_breadcrumb(
        "catalog",
        "Product listing",
        Some(&[("signature", query.signature().as_str())]),
    );

    let page = state.catalog().find_products(&query).await?;
    tracing::debug!(
        signature = %query.signature(),
        total = page.total,
        returned = page.len(),
        "Served product page"
    );

    Ok(Json(page))
}

/// List distinct product categories.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.catalog().categories().await?))
}
