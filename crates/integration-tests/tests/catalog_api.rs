//! HTTP contract of the catalog API.

#![allow(clippy::unwrap_used)]

use std::num::{NonZeroU32, NonZeroU64};

use emporium_integration_tests::{TestServer, mixed_catalog, shirts};
use reqwest::StatusCode;
use serde_json::Value;

async fn get_json(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start(Vec::new()).await;
    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_paging_through_a_category() {
    let server = TestServer::start(mixed_catalog()).await;

    let (status, body) =
        get_json(&server.url("/api/products?category=Shirts&page=1&limit=20")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 45);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 20);
    assert_eq!(body["data"][0]["_id"], "shirt-1");

    let (_, last) = get_json(&server.url("/api/products?category=Shirts&page=3&limit=20")).await;
    assert_eq!(last["data"].as_array().unwrap().len(), 5);
    assert_eq!(last["data"][0]["_id"], "shirt-41");

    let (_, past_end) =
        get_json(&server.url("/api/products?category=Shirts&page=4&limit=20")).await;
    assert_eq!(past_end["data"].as_array().unwrap().len(), 0);
    assert_eq!(past_end["total"], 45);
}

#[tokio::test]
async fn test_empty_category_is_a_successful_empty_page() {
    let server = TestServer::start(mixed_catalog()).await;

    let (status, body) = get_json(&server.url("/api/products?category=Jackets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Array(Vec::new()));
    assert_eq!(body["total"], 0);
    assert_eq!(body["totalPages"], 0);
}

#[tokio::test]
async fn test_search_and_sort() {
    let server = TestServer::start(mixed_catalog()).await;

    let (_, body) = get_json(&server.url("/api/products?search=LINEN")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Linen Chinos");

    let (_, body) = get_json(&server.url("/api/products?category=hats&sort=price-asc")).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Wool Beanie", "Straw Hat"]);
}

#[tokio::test]
async fn test_invalid_page_is_rejected() {
    let server = TestServer::start(shirts(3)).await;

    for bad in ["page=0", "page=-1", "limit=abc"] {
        let (status, body) = get_json(&server.url(&format!("/api/products?{bad}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert!(body["error"].as_str().unwrap().contains("positive integer"));
    }
}

#[tokio::test]
async fn test_limit_is_capped() {
    let server = TestServer::start_with(shirts(30), |config| {
        config.catalog.max_page_size = NonZeroU32::new(10).unwrap();
    })
    .await;

    let (_, body) = get_json(&server.url("/api/products?limit=50")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["totalPages"], 3);
}

#[tokio::test]
async fn test_categories() {
    let server = TestServer::start(mixed_catalog()).await;

    let (status, body) = get_json(&server.url("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["Shirts", "Hats", "Trousers"]));
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let server = TestServer::start(Vec::new()).await;

    let (status, body) = get_json(&server.url("/api/orders")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("/orders"));
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let server = TestServer::start_with(shirts(1), |config| {
        config.rate_limit.burst = NonZeroU32::new(2).unwrap();
        config.rate_limit.per_second = NonZeroU64::new(60).unwrap();
    })
    .await;
    let client = reqwest::Client::new();
    let url = server.url("/api/products");

    for _ in 0..2 {
        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client IP (as reported by the proxy) has its own bucket.
    let response = client
        .get(&url)
        .header("x-forwarded-for", "203.0.113.7")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Health checks are not rate limited.
    let response = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::start(Vec::new()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/api/products"))
        .header("x-request-id", "listing-42")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "listing-42");

    let response = client.get(server.url("/health")).send().await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = TestServer::start(Vec::new()).await;

    let response = reqwest::Client::new()
        .get(server.url("/api/products"))
        .header("origin", "https://shop.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
