//! Single-store gateway endpoint.
//!
//! `POST /api/shopify` takes `{url, accessToken}`, fetches that store and
//! returns `{shop, products, orders}`. `GatewayClient` is the matching
//! client.

use axum::{Json, Router, extract::State, routing::post};
use storefleet_core::{StoreCredential, StoreData};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

/// Build the gateway router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/shopify", post(fetch_store))
}

/// Fetch one store on the caller's behalf.
///
/// # Errors
///
/// Returns 502 if the upstream fetch fails, 503 if the server is shutting
/// down.
#[instrument(skip_all, fields(store_url = tracing::field::Empty))]
pub async fn fetch_store(
    State(state): State<AppState>,
    Json(credential): Json<StoreCredential>,
) -> Result<Json<StoreData>, AppError> {
    tracing::Span::current().record("store_url", credential.url().as_str());
    tokio::select! {
        biased;
        () = state.shutdown().cancelled() => Err(AppError::Cancelled),
        result = state.fetcher().fetch_store(&credential) => Ok(Json(result?)),
    }
}
