//! HTTP middleware stack for the catalog API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (add unique ID to each request)
//! 4. Rate limiting on `/api` (governor)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::api_rate_limiter;
pub use request_id::request_id_middleware;
