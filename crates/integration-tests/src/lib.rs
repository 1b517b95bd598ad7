//! Integration tests for Storefleet.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefleet-integration-tests
//! ```
//!
//! No external services are needed: every store is a `wiremock` server
//! speaking the Admin REST API, and the dashboard router is driven in-process
//! with `tower::ServiceExt::oneshot` (or bound to an ephemeral port when a
//! real HTTP client is needed).
//!
//! # Test Categories
//!
//! - `fanout` - Concurrent fetch against fake stores
//! - `dashboard_api` - JSON API and HTML page through the router
//! - `gateway` - `GatewayClient` against a live dashboard server

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use storefleet_core::StoreCredential;
use storefleet_dashboard::config::DashboardConfig;
use storefleet_dashboard::services::MemoryCredentialStore;
use storefleet_dashboard::shopify::StoreClient;
use storefleet_dashboard::state::AppState;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Access token every fake store accepts.
pub const TEST_TOKEN: &str = "shpat_integration";

const API_PREFIX: &str = "/admin/api/2024-10";

/// A fake store serving `shop.json`, `products.json` and `orders.json`.
pub struct FakeStore {
    pub server: MockServer,
}

impl FakeStore {
    /// Start a store answering immediately.
    pub async fn start(name: &str, products: Value, orders: Value) -> Self {
        Self::start_with_delay(name, products, orders, Duration::ZERO).await
    }

    /// Start a store whose every response is delayed by `delay`.
    pub async fn start_with_delay(
        name: &str,
        products: Value,
        orders: Value,
        delay: Duration,
    ) -> Self {
        let server = MockServer::start().await;
        let shop = json!({"shop": {"name": name, "domain": format!("{}.example.com", name.to_lowercase())}});

        for (resource, body) in [
            ("shop", shop),
            ("products", json!({ "products": products })),
            ("orders", json!({ "orders": orders })),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("{API_PREFIX}/{resource}.json")))
                .and(header("X-Shopify-Access-Token", TEST_TOKEN))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(body)
                        .set_delay(delay),
                )
                .mount(&server)
                .await;
        }

        Self { server }
    }

    /// Start a store that answers every request with `status`.
    pub async fn failing(status: u16) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream down"))
            .mount(&server)
            .await;
        Self { server }
    }

    /// The store's URL as connected (`http://127.0.0.1:<port>`).
    #[must_use]
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// A credential for this store.
    #[must_use]
    pub fn credential(&self) -> StoreCredential {
        StoreCredential::new(self.url(), TEST_TOKEN).unwrap()
    }
}

/// A product with one variant.
#[must_use]
pub fn product(title: &str, price: &str, inventory: Option<i64>) -> Value {
    json!({
        "title": title,
        "variants": [{"price": price, "inventory_quantity": inventory}]
    })
}

/// An order.
#[must_use]
pub fn order(name: &str, total: &str) -> Value {
    json!({
        "name": name,
        "created_at": "2024-10-01T10:00:00Z",
        "total_price": total,
        "line_items": []
    })
}

/// Default configuration with no environment.
#[must_use]
pub fn test_config() -> DashboardConfig {
    DashboardConfig::from_lookup(|_| None).unwrap()
}

/// Dashboard state with an Admin API client and in-memory credentials.
#[must_use]
pub fn test_state(credentials: Vec<StoreCredential>) -> AppState {
    let config = test_config();
    let client = StoreClient::new(&config.shopify).unwrap();
    AppState::with_parts(
        config,
        Arc::new(MemoryCredentialStore::with_credentials(credentials)),
        Arc::new(client),
    )
}

/// Send a request through the router and return status and raw body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Send a request through the router and parse the JSON body.
pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Build a JSON request.
#[must_use]
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request with no body.
#[must_use]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
