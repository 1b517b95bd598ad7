//! Upstream store records: shop metadata, products and orders.
//!
//! These mirror the commerce platform's Admin REST payloads, reduced to the
//! fields Storefleet reads. Unknown fields are ignored. Fields that are read
//! but may legitimately be absent are `Option`s; everything else is required
//! and a payload without it fails to deserialize.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::{Amount, parse_decimal};
use crate::error::DataFormatError;

/// Shop metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    /// Shop display name.
    pub name: String,
    /// Primary domain.
    pub domain: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// ISO 4217 currency code of the shop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A product variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant price.
    pub price: Amount,
    /// Inventory on hand, when tracked.
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

/// A product with its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Product title.
    pub title: String,
    /// Product type/category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    /// Variants, first one is the default.
    pub variants: Vec<Variant>,
}

impl Product {
    /// The default (first) variant.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if the product has no variants.
    pub fn primary_variant(&self) -> Result<&Variant, DataFormatError> {
        self.variants.first().ok_or_else(|| {
            DataFormatError::new("variants", format!("product {:?} has no variants", self.title))
        })
    }

    /// Price of the default variant.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if there are no variants or the price is
    /// not a decimal.
    pub fn price(&self) -> Result<Decimal, DataFormatError> {
        self.primary_variant()?.price.to_decimal("price")
    }

    /// Inventory of the default variant, if tracked.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if the product has no variants.
    pub fn inventory(&self) -> Result<Option<i64>, DataFormatError> {
        Ok(self.primary_variant()?.inventory_quantity)
    }

    /// Check the fields views and aggregates read.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` on an empty variant list or bad price.
    pub fn validate(&self) -> Result<(), DataFormatError> {
        self.price().map(|_| ())
    }
}

/// A line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Quantity ordered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// An order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Order name (e.g., "#1001").
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Order total as a decimal string.
    pub total_price: String,
    /// Line items.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Order total as a decimal.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if `total_price` is not a decimal.
    pub fn total(&self) -> Result<Decimal, DataFormatError> {
        parse_decimal("total_price", &self.total_price)
    }
}
