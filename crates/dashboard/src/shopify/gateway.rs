//! Client for a remote `/api/shopify` gateway.
//!
//! The gateway receives `{ "url", "accessToken" }` and answers with
//! `{ "shop", "products", "orders" }` for that store. Any Storefleet
//! dashboard instance serves this endpoint.

use async_trait::async_trait;
use storefleet_core::{StoreCredential, StoreData};
use tracing::instrument;
use url::Url;

use super::{ShopifyError, StoreFetcher, truncate_body};

/// Fetches store data through a gateway endpoint.
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl GatewayClient {
    /// Create a client posting to `endpoint` (e.g., `http://host:3000/api/shopify`).
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// The gateway endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl StoreFetcher for GatewayClient {
    #[instrument(skip_all, fields(store_url = %credential.url(), gateway = %self.endpoint))]
    async fn fetch_store(&self, credential: &StoreCredential) -> Result<StoreData, ShopifyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(credential)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let data: StoreData = serde_json::from_str(&body)?;
        data.validate()?;
        Ok(data)
    }
}
