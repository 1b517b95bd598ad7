//! Fetch every connected store and summarize.

use std::sync::Arc;

use storefleet_core::{AggregateSummary, StoreSummary, aggregate, format_money};
use storefleet_dashboard::config::DashboardConfig;
use storefleet_dashboard::services::{CredentialStore, FanOut};
use storefleet_dashboard::shopify::{GatewayClient, StoreClient, StoreFetcher};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::CliError;

/// Cross-store and per-store totals from one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// Totals across all stores.
    pub summary: AggregateSummary,
    /// Per-store totals, in connection order.
    pub stores: Vec<StoreSummary>,
}

impl FetchReport {
    /// Log one line per store and one for the aggregate.
    pub fn log(&self) {
        for store in &self.stores {
            tracing::info!(
                store_url = %store.store_url,
                products = store.totals.total_products,
                orders = store.totals.total_orders,
                inventory = store.total_inventory,
                revenue = %format_money(store.totals.total_revenue),
                "{}",
                store.shop_name
            );
        }
        tracing::info!(
            stores = self.stores.len(),
            products = self.summary.total_products,
            orders = self.summary.total_orders,
            revenue = %format_money(self.summary.total_revenue),
            "All stores"
        );
    }
}

/// Build the fan-out: direct Admin API calls, or through a gateway.
pub fn fan_out(config: &DashboardConfig, gateway: Option<Url>) -> Result<FanOut, CliError> {
    let fetcher: Arc<dyn StoreFetcher> = match gateway {
        Some(endpoint) => {
            let gateway = GatewayClient::new(endpoint);
            tracing::info!(gateway = %gateway.endpoint(), "Fetching through gateway");
            Arc::new(gateway)
        }
        None => Arc::new(StoreClient::new(&config.shopify)?),
    };
    Ok(FanOut::new(fetcher).with_max_concurrency(config.max_concurrent_fetches))
}

/// Fetch all connected stores. Ctrl+C abandons the fetch.
pub async fn run(store: &dyn CredentialStore, fan_out: &FanOut) -> Result<FetchReport, CliError> {
    let credentials = store.load().await?;
    if credentials.is_empty() {
        tracing::warn!("No stores connected; add one with `sf-cli stores add`");
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let result = fan_out.fetch_all_cancellable(credentials, &cancel).await;
    watcher.abort();
    let bundles = result?;

    let summary = aggregate(&bundles)?;
    let stores = bundles
        .iter()
        .map(StoreSummary::of)
        .collect::<Result<_, _>>()?;
    Ok(FetchReport { summary, stores })
}
