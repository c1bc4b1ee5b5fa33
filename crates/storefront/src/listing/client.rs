//! HTTP client for the catalog API.

use std::sync::Arc;

use emporium_core::{PageEnvelope, ProductPage, ProductQuery};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{CatalogSource, FetchError};
use crate::config::ListingConfig;

const PRODUCTS_PATH: &str = "api/products";

/// Client for `GET /api/products`.
///
/// No authentication or extra headers; offset pagination only. Failures are
/// returned as-is, never retried.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl CatalogClient {
    /// Create a client from listing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the API URL
    /// cannot be joined with the products path.
    pub fn new(config: &ListingConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Self::with_client(client, &config.api_url)
    }

    /// Create a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot be joined with the products path.
    pub fn with_client(client: reqwest::Client, base_url: &Url) -> Result<Self, FetchError> {
        let endpoint = products_endpoint(base_url)?;
        Ok(Self {
            inner: Arc::new(CatalogClientInner { client, endpoint }),
        })
    }

    /// The products endpoint this client calls.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// The full request URL for `query`.
    #[must_use]
    pub fn request_url(&self, query: &ProductQuery) -> Url {
        let mut url = self.inner.endpoint.clone();
        url.query_pairs_mut().extend_pairs(query.to_query_pairs());
        url
    }
}

impl CatalogSource for CatalogClient {
    #[instrument(skip(self, query), fields(signature = %query.signature()))]
    async fn fetch_page(&self, query: &ProductQuery) -> Result<ProductPage, FetchError> {
        let url = self.request_url(query);
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        // Body first, so a failure status can still report the API's message
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            warn!(status = %status, message = %message, "Catalog API returned non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: PageEnvelope = serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            FetchError::Parse(e)
        })?;

        let page = ProductPage::from_envelope(envelope, query.limit());
        debug!(
            total = page.total,
            returned = page.len(),
            "Fetched product page"
        );
        Ok(page)
    }
}

fn products_endpoint(base_url: &Url) -> Result<Url, FetchError> {
    // Url::join replaces the last segment unless the base ends with '/'
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(PRODUCTS_PATH)?)
}

/// Pull a human-readable message out of an error body, if it has one.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key)?.as_str())
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::with_client(reqwest::Client::new(), &Url::parse(base).unwrap())
            .unwrap()
    }

    #[test]
    fn test_endpoint_from_bare_host() {
        let client = client("http://127.0.0.1:3000");
        assert_eq!(
            client.endpoint().as_str(),
            "http://127.0.0.1:3000/api/products"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://shop.example.com/store");
        assert_eq!(
            client.endpoint().as_str(),
            "https://shop.example.com/store/api/products"
        );
    }

    #[test]
    fn test_request_url_carries_query_parameters() {
        let client = client("http://localhost:3000/");
        let query = ProductQuery::new()
            .with_category("Shirts")
            .with_search("linen shirt")
            .with_limit(NonZeroU32::new(12).unwrap());

        let url = client.request_url(&query);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("category".to_string(), "Shirts".to_string()),
                ("limit".to_string(), "12".to_string()),
                ("page".to_string(), "1".to_string()),
                ("search".to_string(), "linen shirt".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "page must be a positive integer"}"#),
            Some("page must be a positive integer".to_string())
        );
        assert_eq!(
            error_message(r#"{"message": "Service unavailable"}"#),
            Some("Service unavailable".to_string())
        );
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(r#"{"error": {"code": 1}}"#), None);
        assert_eq!(error_message(r#"{"error": ""}"#), None);
    }
}
