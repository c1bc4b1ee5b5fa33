//! Rate limiting middleware using governor and `tower_governor`.
//!
//! The catalog API is public and cheap to hammer with filter permutations,
//! so `/api` routes are limited per client IP with a token bucket.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that prefers proxy headers (Cloudflare, generic proxies,
/// Fly.io) and falls back to the peer address of the connection.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req).ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Resolve the client IP of a request.
pub fn client_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    let header_ip = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    // CF-Connecting-IP first (Cloudflare's real client IP)
    header_ip("cf-connecting-ip")
        // X-Forwarded-For carries a chain; the first entry is the client
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
        .or_else(|| header_ip("x-real-ip"))
        // Fly.io's header
        .or_else(|| header_ip("fly-client-ip"))
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for catalog API routes.
///
/// With the defaults (1 token per second, burst of 50) a browser paging
/// through filters never notices it.
///
/// # Panics
///
/// This function will not panic. `RateLimitConfig` holds only non-zero
/// values, which are always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter(config: &RateLimitConfig) -> RateLimiterLayer {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(config.per_second.get())
        .burst_size(config.burst.get())
        .finish()
        .expect("rate limiter config with non-zero period and burst is valid");
    GovernorLayer::new(Arc::new(governor))
}
