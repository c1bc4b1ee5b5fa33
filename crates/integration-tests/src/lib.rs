//! Integration tests for Emporium.
//!
//! Each test starts its own catalog API server on an ephemeral port with an
//! in-memory catalog, then talks to it over real HTTP, either with `reqwest`
//! directly or through the storefront's listing client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_api` - HTTP contract of `/api/products` and `/api/categories`
//! - `product_listing` - Listing client, cache and controller against a live server

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::num::{NonZeroU32, NonZeroU64};
use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header};
use emporium_core::Product;
use emporium_storefront::catalog::MemoryCatalog;
use emporium_storefront::config::StorefrontConfig;
use emporium_storefront::state::AppState;
use rust_decimal::Decimal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;

/// A catalog API server running on a background task.
///
/// Shut down when dropped.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over `products` with default configuration.
    pub async fn start(products: Vec<Product>) -> Self {
        Self::start_with(products, |_| {}).await
    }

    /// Start a server over `products`, adjusting the configuration first.
    pub async fn start_with(
        products: Vec<Product>,
        configure: impl FnOnce(&mut StorefrontConfig),
    ) -> Self {
        let mut config =
            StorefrontConfig::from_lookup(|_| None).expect("Default configuration is valid");
        // Generous by default so tests don't trip the limiter by accident
        config.rate_limit.burst = NonZeroU32::new(1_000).expect("non-zero");
        config.rate_limit.per_second = NonZeroU64::new(1).expect("non-zero");
        configure(&mut config);

        let state = AppState::new(config, Arc::new(MemoryCatalog::new(products)));
        Self::serve_router(emporium_storefront::app(state)).await
    }

    /// Start a stand-in API answering every request with `status` and the
    /// JSON `body`.
    pub async fn start_fixed(status: StatusCode, body: &'static str) -> Self {
        let app = Router::new().fallback(move || async move {
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        });
        Self::serve_router(app).await
    }

    async fn serve_router(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has an address");

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            emporium_storefront::serve(listener, app, async {
                let _ = rx.await;
            })
            .await
            .expect("Test server failed");
        });

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:54321/`.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("Socket address forms a valid URL")
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// `count` shirts priced 10.00, 11.00, ... in catalog order.
#[must_use]
pub fn shirts(count: u32) -> Vec<Product> {
    (1..=count)
        .map(|n| {
            Product::new(
                format!("shirt-{n}"),
                format!("Shirt {n:02}"),
                Decimal::from(9 + n),
                "Shirts",
            )
        })
        .collect()
}

/// A small mixed catalog: 45 shirts, a few hats and trousers, no jackets.
#[must_use]
pub fn mixed_catalog() -> Vec<Product> {
    let mut products = shirts(45);
    products.push(Product::new("hat-1", "Straw Hat", Decimal::from(30), "Hats"));
    products.push(Product::new("hat-2", "Wool Beanie", Decimal::from(18), "Hats"));

    let mut chinos = Product::new("trousers-1", "Linen Chinos", Decimal::from(60), "Trousers");
    chinos.discount = Decimal::from(25);
    products.push(chinos);

    products
}
