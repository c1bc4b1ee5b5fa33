//! Emporium storefront library.
//!
//! Two halves of the product catalog live here:
//!
//! - the catalog API server ([`app`], [`serve`]): `GET /api/products` and
//!   `GET /api/categories` over a [`catalog::CatalogStore`]
//! - the product listing client ([`listing`]): fetches pages from that API,
//!   caches them by query signature and keeps only the newest result
//!
//! Both are exposed as a library so the binary and the integration tests
//! build the exact same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod listing;
pub mod middleware;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{Method, Request, Response};
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{api_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Build the storefront router with all middleware except Sentry.
///
/// Must be served with connect info (see [`serve`]) so the rate limiter can
/// fall back to the peer address when no proxy header is present.
pub fn app(state: AppState) -> Router {
    let rate_limiter = api_rate_limiter(&state.config().rate_limit);

    // The API is read-only and unauthenticated; any origin may call it.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let api = routes::api_routes().layer(rate_limiter).layer(cors);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if accepting connections fails.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
