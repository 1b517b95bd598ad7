//! JSON API route handlers.

pub mod shopify;
pub mod stores;
pub mod summary;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(stores::router())
        .merge(summary::router())
        .merge(shopify::router())
}
