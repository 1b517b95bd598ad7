//! Integration tests for the concurrent multi-store fetch.
//!
//! Each store is its own fake Admin API server; the fan-out drives the real
//! `StoreClient` against all of them.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use storefleet_core::{StoreCredential, aggregate, format_money};
use storefleet_dashboard::services::{FanOut, FanOutError};
use storefleet_dashboard::shopify::{ShopifyError, StoreClient};
use storefleet_integration_tests::{FakeStore, order, product, test_config};
use tokio_util::sync::CancellationToken;

fn fan_out() -> FanOut {
    let client = StoreClient::new(&test_config().shopify).unwrap();
    FanOut::new(Arc::new(client))
}

#[tokio::test]
async fn test_two_stores_aggregate() {
    let first = FakeStore::start(
        "Alpha",
        json!([product("A", "1.00", Some(3)), product("B", "2.00", None)]),
        json!([order("#1001", "10.50"), order("#1002", "5.25")]),
    )
    .await;
    let second = FakeStore::start(
        "Beta",
        json!([product("C", "3.00", Some(1))]),
        json!([order("#2001", "1.00")]),
    )
    .await;

    let bundles = fan_out()
        .fetch_all(vec![first.credential(), second.credential()])
        .await
        .unwrap();

    assert_eq!(bundles.len(), 2);
    assert_eq!(bundles[0].shop.name, "Alpha");
    assert_eq!(bundles[0].store_url.as_str(), first.url());
    assert_eq!(bundles[1].shop.name, "Beta");

    let summary = aggregate(&bundles).unwrap();
    assert_eq!(summary.total_products, 3);
    assert_eq!(summary.total_orders, 3);
    assert_eq!(format_money(summary.total_revenue), "$16.75");
}

#[tokio::test]
async fn test_order_follows_input_not_completion() {
    let slow = FakeStore::start_with_delay(
        "Slow",
        json!([]),
        json!([]),
        Duration::from_millis(200),
    )
    .await;
    let fast = FakeStore::start("Fast", json!([]), json!([])).await;

    let bundles = fan_out()
        .fetch_all(vec![slow.credential(), fast.credential()])
        .await
        .unwrap();

    let names: Vec<&str> = bundles.iter().map(|b| b.shop.name.as_str()).collect();
    assert_eq!(names, vec!["Slow", "Fast"]);
}

#[tokio::test]
async fn test_stores_are_fetched_concurrently() {
    let delay = Duration::from_millis(300);
    let mut stores = Vec::new();
    for name in ["One", "Two", "Three"] {
        stores.push(FakeStore::start_with_delay(name, json!([]), json!([]), delay).await);
    }
    let credentials: Vec<StoreCredential> = stores.iter().map(FakeStore::credential).collect();

    let started = Instant::now();
    fan_out().fetch_all(credentials).await.unwrap();

    // Sequential fetching would take at least 3 x 300ms
    assert!(started.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_unauthorized_store_fails_everything() {
    let good = FakeStore::start("Good", json!([]), json!([order("#1", "9.99")])).await;
    let bad = FakeStore::failing(401).await;

    let failure = fan_out()
        .fetch_all(vec![good.credential(), bad.credential()])
        .await
        .unwrap_err();

    assert_eq!(failure.store_url.as_str(), bad.url());
    assert!(matches!(failure.cause, ShopifyError::Unauthorized(_)));
}

#[tokio::test]
async fn test_malformed_order_total_is_rejected() {
    let store = FakeStore::start("Broken", json!([]), json!([order("#1", "abc")])).await;

    let failure = fan_out()
        .fetch_all(store.credential())
        .await
        .unwrap_err();

    assert!(matches!(failure.cause, ShopifyError::Data(ref e) if e.field == "total_price"));
}

#[tokio::test]
async fn test_cancellation_abandons_slow_store() {
    let slow = FakeStore::start_with_delay(
        "Slow",
        json!([]),
        json!([]),
        Duration::from_secs(10),
    )
    .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = fan_out()
        .fetch_all_cancellable(slow.credential(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, FanOutError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}
