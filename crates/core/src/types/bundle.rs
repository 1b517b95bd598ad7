//! Per-store data bundles.

use serde::{Deserialize, Serialize};

use super::credential::StoreUrl;
use super::shop::{Order, Product, ShopInfo};
use crate::error::DataFormatError;

/// One store's shop, products and orders as returned by the upstream fetch.
///
/// This is also the body of the gateway endpoint's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    /// Shop metadata.
    pub shop: ShopInfo,
    /// All products.
    pub products: Vec<Product>,
    /// All orders.
    pub orders: Vec<Order>,
}

impl StoreData {
    /// Check every record the views and aggregates read.
    ///
    /// # Errors
    ///
    /// Returns the first `DataFormatError` found: a product without variants
    /// or with an unreadable price, or an order with an unreadable total.
    pub fn validate(&self) -> Result<(), DataFormatError> {
        for product in &self.products {
            product.validate()?;
        }
        for order in &self.orders {
            order.total()?;
        }
        Ok(())
    }

    /// Tag the data with the store it was fetched from.
    #[must_use]
    pub fn into_bundle(self, store_url: StoreUrl) -> StoreDataBundle {
        StoreDataBundle {
            shop: self.shop,
            products: self.products,
            orders: self.orders,
            store_url,
        }
    }
}

/// Fetched data for one store, tagged with its URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDataBundle {
    /// Shop metadata.
    pub shop: ShopInfo,
    /// All products.
    pub products: Vec<Product>,
    /// All orders.
    pub orders: Vec<Order>,
    /// URL of the credential this bundle was fetched with.
    pub store_url: StoreUrl,
}
