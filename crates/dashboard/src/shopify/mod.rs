//! Per-store upstream clients for the commerce platform's Admin API.
//!
//! # Architecture
//!
//! - [`StoreFetcher`] is the seam the fan-out calls: one credential in, one
//!   store's shop/products/orders out
//! - [`StoreClient`] talks to the Admin REST API directly
//! - [`GatewayClient`] posts the credential to a `/api/shopify` gateway that
//!   performs the fetch on its behalf
//!
//! Every payload is validated at this boundary (`StoreData::validate`), so
//! downstream code never sees a product without variants or an order total
//! that is not a decimal.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefleet_dashboard::shopify::{StoreClient, StoreFetcher};
//!
//! let client = StoreClient::new(&config.shopify)?;
//! let data = client.fetch_store(&credential).await?;
//! ```

mod client;
mod gateway;

pub use client::StoreClient;
pub use gateway::GatewayClient;

use async_trait::async_trait;
use storefleet_core::{DataFormatError, StoreCredential, StoreData};
use thiserror::Error;

/// Fetches one store's data.
#[async_trait]
pub trait StoreFetcher: Send + Sync {
    /// Fetch shop metadata, all products and all orders for `credential`.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` on transport failure, non-success status or
    /// malformed payload.
    async fn fetch_store(&self, credential: &StoreCredential) -> Result<StoreData, ShopifyError>;
}

/// Errors that can occur when fetching from the Admin API or a gateway.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Upstream returned a non-success status.
    #[error("Upstream returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Payload violated the expected shape.
    #[error("Data format error: {0}")]
    Data(#[from] DataFormatError),
}

/// Longest upstream body kept in `ShopifyError::Status`.
const MAX_ERROR_BODY: usize = 512;

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}
