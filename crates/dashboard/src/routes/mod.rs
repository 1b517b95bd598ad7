//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Health check
//!
//! # Dashboard
//! GET    /                     - HTML dashboard (aggregate banner, per-store tabs)
//!
//! # Stores
//! GET    /api/stores           - Connected store URLs
//! POST   /api/stores           - Connect one credential or an array
//! DELETE /api/stores/{store}   - Disconnect a store
//!
//! # Data
//! GET    /api/dashboard        - Fetch all stores and aggregate
//! POST   /api/shopify          - Fetch one store (gateway)
//! ```

pub mod api;
pub mod dashboard;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(dashboard::dashboard))
        .merge(api::router())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
