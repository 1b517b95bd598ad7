//! Core types for Storefleet.
//!
//! This module provides type-safe wrappers for store credentials and the
//! records fetched from each store.

pub mod bundle;
pub mod credential;
pub mod price;
pub mod shop;
pub mod summary;

pub use bundle::{StoreData, StoreDataBundle};
pub use credential::{AccessToken, CredentialSet, StoreCredential, StoreUrl};
pub use price::{Amount, format_money, parse_decimal};
pub use shop::{LineItem, Order, Product, ShopInfo, Variant};
pub use summary::{AggregateSummary, StoreSummary};
