//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Server
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CATALOG_SEED_PATH` - JSON file with the product array to serve
//! - `CATALOG_MAX_PAGE_SIZE` - Upper bound for `limit` (default: 100)
//! - `RATE_LIMIT_PER_SECOND` - Seconds to replenish one request token (default: 1)
//! - `RATE_LIMIT_BURST` - Requests allowed in a burst per client IP (default: 50)
//!
//! ## Listing client
//! - `CATALOG_API_URL` - Base URL of the catalog API (default: <http://127.0.0.1:3000>)
//! - `CATALOG_CACHE_TTL_SECS` - Freshness window for cached pages (default: 300)
//! - `CATALOG_CACHE_MAX_ENTRIES` - Optional bound on cached pages (default: unbounded)
//! - `CATALOG_REQUEST_TIMEOUT_SECS` - Optional per-request timeout
//!
//! ## Telemetry
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::num::{NonZeroU32, NonZeroU64};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog API server configuration
    pub catalog: CatalogConfig,
    /// Per-IP rate limiting for `/api` routes
    pub rate_limit: RateLimitConfig,
    /// Product listing client configuration
    pub listing: ListingConfig,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// Catalog API server configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// JSON seed file for the in-memory catalog
    pub seed_path: Option<PathBuf>,
    /// Largest page size a client may request
    pub max_page_size: NonZeroU32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            max_page_size: NonZeroU32::new(100).expect("100 is non-zero"),
        }
    }
}

/// Token-bucket parameters for the API rate limiter.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Seconds to replenish one request token
    pub per_second: NonZeroU64,
    /// Burst size per client IP
    pub burst: NonZeroU32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: NonZeroU64::MIN,
            burst: NonZeroU32::new(50).expect("50 is non-zero"),
        }
    }
}

/// Product listing client configuration.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    /// Base URL of the catalog API
    pub api_url: Url,
    /// How long a cached page may be served without re-fetching
    pub freshness_window: Duration,
    /// Optional bound on the number of cached pages
    pub cache_max_entries: Option<u64>,
    /// Optional per-request timeout (transport default otherwise)
    pub request_timeout: Option<Duration>,
}

impl ListingConfig {
    /// Listing configuration for a catalog API at `api_url` with defaults.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            freshness_window: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_max_entries: None,
            request_timeout: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("STOREFRONT_PORT", 3000)?;

        let catalog = CatalogConfig {
            seed_path: env.optional("CATALOG_SEED_PATH").map(PathBuf::from),
            max_page_size: env.parse_or(
                "CATALOG_MAX_PAGE_SIZE",
                CatalogConfig::default().max_page_size,
            )?,
        };

        let rate_limit = RateLimitConfig {
            per_second: env.parse_or(
                "RATE_LIMIT_PER_SECOND",
                RateLimitConfig::default().per_second,
            )?,
            burst: env.parse_or("RATE_LIMIT_BURST", RateLimitConfig::default().burst)?,
        };

        let api_url = env.parse_or(
            "CATALOG_API_URL",
            Url::parse(DEFAULT_API_URL).map_err(|e| {
                ConfigError::InvalidEnvVar("CATALOG_API_URL".to_string(), e.to_string())
            })?,
        )?;
        let listing = ListingConfig {
            api_url,
            freshness_window: Duration::from_secs(
                env.parse_or("CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            ),
            cache_max_entries: env.parse_optional("CATALOG_CACHE_MAX_ENTRIES")?,
            request_timeout: env
                .parse_optional::<u64>("CATALOG_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs),
        };

        Ok(Self {
            host,
            port,
            catalog,
            rate_limit,
            listing,
            log_format: env.parse_or("LOG_FORMAT", LogFormat::default())?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse an optional variable.
    fn parse_optional<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse_optional(key)?.unwrap_or(default))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.catalog.max_page_size.get(), 100);
        assert!(config.catalog.seed_path.is_none());
        assert_eq!(config.rate_limit.per_second.get(), 1);
        assert_eq!(config.rate_limit.burst.get(), 50);
        assert_eq!(config.listing.api_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.listing.freshness_window, Duration::from_secs(300));
        assert_eq!(config.listing.cache_max_entries, None);
        assert_eq!(config.listing.request_timeout, None);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("CATALOG_SEED_PATH", "data/products.json"),
            ("CATALOG_MAX_PAGE_SIZE", "48"),
            ("CATALOG_API_URL", "https://shop.example.com"),
            ("CATALOG_CACHE_TTL_SECS", "60"),
            ("CATALOG_CACHE_MAX_ENTRIES", "500"),
            ("CATALOG_REQUEST_TIMEOUT_SECS", "10"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(
            config.catalog.seed_path,
            Some(PathBuf::from("data/products.json"))
        );
        assert_eq!(config.catalog.max_page_size.get(), 48);
        assert_eq!(config.listing.api_url.host_str(), Some("shop.example.com"));
        assert_eq!(config.listing.freshness_window, Duration::from_secs(60));
        assert_eq!(config.listing.cache_max_entries, Some(500));
        assert_eq!(
            config.listing.request_timeout,
            Some(Duration::from_secs(10))
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("STOREFRONT_PORT", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("STOREFRONT_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let err = load(&[("CATALOG_MAX_PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_log_format() {
        let err = load(&[("LOG_FORMAT", "xml")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid environment variable LOG_FORMAT: expected `text` or `json`, got `xml`"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(load(&[("CATALOG_API_URL", "not a url")]).is_err());
    }
}
