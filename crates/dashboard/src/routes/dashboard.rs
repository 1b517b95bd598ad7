//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use storefleet_core::{
    AggregateSummary, DataFormatError, Order, Product, StoreDataBundle, StoreSummary, aggregate,
    format_money,
};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Summary figures formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    /// Product count.
    pub products: String,
    /// Order count.
    pub orders: String,
    /// Revenue as money (e.g., `$16.75`).
    pub revenue: String,
}

impl From<&AggregateSummary> for SummaryView {
    fn from(summary: &AggregateSummary) -> Self {
        Self {
            products: summary.total_products.to_string(),
            orders: summary.total_orders.to_string(),
            revenue: format_money(summary.total_revenue),
        }
    }
}

/// Product table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    /// Product title.
    pub title: String,
    /// Default-variant inventory, or `N/A` when untracked.
    pub inventory: String,
    /// Default-variant price as money.
    pub price: String,
}

impl ProductRow {
    fn try_from_product(product: &Product) -> Result<Self, DataFormatError> {
        Ok(Self {
            title: product.title.clone(),
            inventory: product
                .inventory()?
                .map_or_else(|| "N/A".to_string(), |qty| qty.to_string()),
            price: format_money(product.price()?),
        })
    }
}

/// Order table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    /// Order name (e.g., `#1001`).
    pub name: String,
    /// Creation date (`YYYY-MM-DD`).
    pub date: String,
    /// Order total as money.
    pub total: String,
}

impl OrderRow {
    fn try_from_order(order: &Order) -> Result<Self, DataFormatError> {
        Ok(Self {
            name: order.name.clone(),
            date: order.created_at.format("%Y-%m-%d").to_string(),
            total: format_money(order.total()?),
        })
    }
}

/// One store's tab.
#[derive(Debug, Clone)]
pub struct StoreView {
    /// Connected store URL.
    pub url: String,
    /// Shop display name.
    pub shop_name: String,
    /// Primary shop domain.
    pub domain: String,
    /// Shop contact email, if exposed.
    pub email: Option<String>,
    /// This store's totals.
    pub summary: SummaryView,
    /// Total tracked inventory.
    pub inventory: String,
    /// Product table.
    pub products: Vec<ProductRow>,
    /// Order table.
    pub orders: Vec<OrderRow>,
}

impl StoreView {
    fn try_from_bundle(bundle: &StoreDataBundle) -> Result<Self, DataFormatError> {
        let summary = StoreSummary::of(bundle)?;
        Ok(Self {
            url: bundle.store_url.to_string(),
            shop_name: bundle.shop.name.clone(),
            domain: bundle.shop.domain.clone(),
            email: bundle.shop.email.clone(),
            summary: SummaryView::from(&summary.totals),
            inventory: summary.total_inventory.to_string(),
            products: bundle
                .products
                .iter()
                .map(ProductRow::try_from_product)
                .collect::<Result<_, _>>()?,
            orders: bundle
                .orders
                .iter()
                .map(OrderRow::try_from_order)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    /// Number of connected stores.
    pub connected: usize,
    /// Totals across all stores, when the fetch succeeded.
    pub summary: Option<SummaryView>,
    /// One tab per store, in connection order.
    pub stores: Vec<StoreView>,
    /// Message shown instead of data when the fetch failed.
    pub error: Option<String>,
}

impl DashboardTemplate {
    fn failed(connected: usize, error: &AppError) -> Self {
        Self {
            connected,
            summary: None,
            stores: vec![],
            error: Some(error.to_string()),
        }
    }
}

/// Build the page model from fetched bundles.
///
/// # Errors
///
/// Returns a `DataFormatError` if any record cannot be displayed.
pub fn build_views(
    bundles: &[StoreDataBundle],
) -> Result<(SummaryView, Vec<StoreView>), DataFormatError> {
    let summary = aggregate(bundles)?;
    let stores = bundles
        .iter()
        .map(StoreView::try_from_bundle)
        .collect::<Result<_, _>>()?;
    Ok((SummaryView::from(&summary), stores))
}

/// Dashboard page handler.
///
/// Fetches every connected store, then renders the aggregate banner and one
/// tab per store. A failed fetch renders an error banner naming the store.
#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>) -> Result<DashboardTemplate, AppError> {
    let credentials = state.credentials().load().await?;
    let connected = credentials.len();

    if credentials.is_empty() {
        return Ok(DashboardTemplate {
            connected,
            summary: None,
            stores: vec![],
            error: None,
        });
    }

    let cancel = state.shutdown().child_token();
    let bundles = match state
        .fan_out()
        .fetch_all_cancellable(credentials, &cancel)
        .await
    {
        Ok(bundles) => bundles,
        Err(e) => {
            let error = AppError::from(e);
            tracing::error!(error = %error, "Dashboard fetch failed");
            return Ok(DashboardTemplate::failed(connected, &error));
        }
    };

    match build_views(&bundles) {
        Ok((summary, stores)) => Ok(DashboardTemplate {
            connected,
            summary: Some(summary),
            stores,
            error: None,
        }),
        Err(e) => {
            let error = AppError::from(e);
            tracing::error!(error = %error, "Dashboard data rejected");
            Ok(DashboardTemplate::failed(connected, &error))
        }
    }
}
