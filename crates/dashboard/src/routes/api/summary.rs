//! Aggregated dashboard data API.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use storefleet_core::{AggregateSummary, StoreDataBundle, StoreSummary, aggregate};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

/// Build the dashboard data router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(dashboard_data))
}

/// Every connected store's data plus cross-store and per-store totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Fetched data, in connection order.
    pub stores: Vec<StoreDataBundle>,
    /// Totals across all stores.
    pub summary: AggregateSummary,
    /// Per-store totals, aligned with `stores`.
    pub store_summaries: Vec<StoreSummary>,
}

impl DashboardResponse {
    /// Aggregate fetched bundles.
    ///
    /// # Errors
    ///
    /// Returns an error if an order total is not a decimal or a sum overflows.
    pub fn from_bundles(stores: Vec<StoreDataBundle>) -> Result<Self, AppError> {
        let summary = aggregate(&stores)?;
        let store_summaries = stores
            .iter()
            .map(StoreSummary::of)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            stores,
            summary,
            store_summaries,
        })
    }
}

/// Fetch all connected stores and aggregate.
///
/// # Errors
///
/// Returns 502 naming the store if any fetch fails; no partial data is
/// returned.
#[instrument(skip(state))]
pub async fn dashboard_data(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let credentials = state.credentials().load().await?;
    let cancel = state.shutdown().child_token();
    let bundles = state
        .fan_out()
        .fetch_all_cancellable(credentials, &cancel)
        .await?;
    Ok(Json(DashboardResponse::from_bundles(bundles)?))
}
