//! Derived summary figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bundle::StoreDataBundle;
use super::credential::StoreUrl;
use super::shop::Order;
use crate::error::DataFormatError;

/// Cross-store totals.
///
/// Always recomputable from a collection of bundles; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    /// Number of products across all stores.
    pub total_products: u64,
    /// Number of orders across all stores.
    pub total_orders: u64,
    /// Sum of order totals across all stores.
    pub total_revenue: Decimal,
}

impl AggregateSummary {
    /// Product, order and revenue figures for one bundle.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if an order total is not a decimal or the
    /// revenue sum overflows.
    pub fn of_bundle(bundle: &StoreDataBundle) -> Result<Self, DataFormatError> {
        Ok(Self {
            total_products: bundle.products.len() as u64,
            total_orders: bundle.orders.len() as u64,
            total_revenue: order_revenue(&bundle.orders)?,
        })
    }

    /// Combine two summaries.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if any total overflows.
    pub fn merge(self, other: Self) -> Result<Self, DataFormatError> {
        Ok(Self {
            total_products: add_count("total_products", self.total_products, other.total_products)?,
            total_orders: add_count("total_orders", self.total_orders, other.total_orders)?,
            total_revenue: self
                .total_revenue
                .checked_add(other.total_revenue)
                .ok_or_else(revenue_overflow)?,
        })
    }
}

fn add_count(field: &str, a: u64, b: u64) -> Result<u64, DataFormatError> {
    a.checked_add(b)
        .ok_or_else(|| DataFormatError::new(field, "count overflow"))
}

fn revenue_overflow() -> DataFormatError {
    DataFormatError::new("total_price", "revenue overflow")
}

fn order_revenue(orders: &[Order]) -> Result<Decimal, DataFormatError> {
    orders.iter().try_fold(Decimal::ZERO, |sum, order| {
        sum.checked_add(order.total()?).ok_or_else(revenue_overflow)
    })
}

/// Figures for a single store, used in per-store tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    /// Store the figures belong to.
    pub store_url: StoreUrl,
    /// Shop display name.
    pub shop_name: String,
    /// Product, order and revenue figures for this store alone.
    #[serde(flatten)]
    pub totals: AggregateSummary,
    /// Sum of default-variant inventory; untracked inventory counts as zero.
    pub total_inventory: i64,
}

impl StoreSummary {
    /// Compute the figures for one bundle.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if an order total is not a decimal, a
    /// product has no variants, or a sum overflows.
    pub fn of(bundle: &StoreDataBundle) -> Result<Self, DataFormatError> {
        let total_inventory =
            bundle
                .products
                .iter()
                .try_fold(0_i64, |sum, product| -> Result<_, DataFormatError> {
                    sum.checked_add(product.inventory()?.unwrap_or(0))
                        .ok_or_else(|| {
                            DataFormatError::new("inventory_quantity", "inventory overflow")
                        })
                })?;

        Ok(Self {
            store_url: bundle.store_url.clone(),
            shop_name: bundle.shop.name.clone(),
            totals: AggregateSummary::of_bundle(bundle)?,
            total_inventory,
        })
    }
}
