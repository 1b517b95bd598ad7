//! Admin REST API client.
//!
//! Fetches `shop.json`, `products.json` and `orders.json` for one store,
//! following `Link: <...>; rel="next"` pagination until every page has been
//! read. The three resources are requested concurrently.
//!
//! Next-page links must stay on the store's origin, since the access token is
//! sent with every page request. A link back to an already-read page, or more
//! than [`MAX_PAGES`] pages, fails the fetch.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, LINK, RETRY_AFTER};
use serde::de::DeserializeOwned;
use storefleet_core::{DataFormatError, Order, Product, ShopInfo, StoreCredential, StoreData};
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use super::{ShopifyError, StoreFetcher, truncate_body};
use crate::config::ShopifyConfig;

/// Upper bound on pages read per resource.
pub const MAX_PAGES: u32 = 1_000;

/// Admin REST API client shared by all stores.
///
/// Holds no per-store state: each call takes the store's credential.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    api_version: String,
    page_size: u32,
}

/// One fetched page: body text and the next page URL, if any.
struct Page {
    body: String,
    next: Option<String>,
}

impl StoreClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(StoreClientInner {
                client: builder.build()?,
                api_version: config.api_version.clone(),
                page_size: config.page_size,
            }),
        })
    }

    fn resource_url(&self, credential: &StoreCredential, resource: &str) -> String {
        format!(
            "{}/admin/api/{}/{resource}.json",
            credential.url().origin(),
            self.inner.api_version
        )
    }

    /// Fetch the store's shop metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload has no `shop`.
    #[instrument(skip_all, fields(store_url = %credential.url()))]
    pub async fn get_shop(&self, credential: &StoreCredential) -> Result<ShopInfo, ShopifyError> {
        let url = self.resource_url(credential, "shop");
        let page = self.get(credential, &url).await?;
        take_field(&page.body, "shop")
    }

    /// Fetch every product, across all pages.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or cannot be parsed.
    #[instrument(skip_all, fields(store_url = %credential.url()))]
    pub async fn get_products(
        &self,
        credential: &StoreCredential,
    ) -> Result<Vec<Product>, ShopifyError> {
        self.get_all(credential, "products", &[]).await
    }

    /// Fetch every order in any status, across all pages.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or cannot be parsed.
    #[instrument(skip_all, fields(store_url = %credential.url()))]
    pub async fn get_orders(&self, credential: &StoreCredential) -> Result<Vec<Order>, ShopifyError> {
        self.get_all(credential, "orders", &[("status", "any")]).await
    }

    async fn get_all<T: DeserializeOwned>(
        &self,
        credential: &StoreCredential,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ShopifyError> {
        let page_size = self.inner.page_size.to_string();
        let first = Url::parse_with_params(
            &self.resource_url(credential, resource),
            query.iter().copied().chain([("limit", page_size.as_str())]),
        )
        .map_err(|e| DataFormatError::new("url", e.to_string()))?;

        let origin = first.origin();
        let mut visited = HashSet::new();
        let mut records = Vec::new();
        let mut next = Some(first);
        let mut pages = 0_u32;

        while let Some(url) = next {
            if pages >= MAX_PAGES {
                let reason = format!("more than {MAX_PAGES} pages");
                return Err(DataFormatError::new("link", reason).into());
            }
            if !visited.insert(url.clone()) {
                let reason = format!("page requested twice: {url}");
                return Err(DataFormatError::new("link", reason).into());
            }

            let page = self.get(credential, url.as_str()).await?;
            let mut batch: Vec<T> = take_field(&page.body, resource)?;
            records.append(&mut batch);
            pages += 1;

            next = page
                .next
                .map(|target| same_origin_url(&target, &origin))
                .transpose()?;
        }

        tracing::debug!(resource, pages, records = records.len(), "Fetched resource");
        Ok(records)
    }

    async fn get(&self, credential: &StoreCredential, url: &str) -> Result<Page, ShopifyError> {
        let response = self
            .inner
            .client
            .get(url)
            .header("X-Shopify-Access-Token", credential.access_token().expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().split('.').next()?.parse().ok())
                .unwrap_or(2);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_url);

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        Ok(Page { body, next })
    }
}

#[async_trait]
impl StoreFetcher for StoreClient {
    #[instrument(skip_all, fields(store_url = %credential.url()))]
    async fn fetch_store(&self, credential: &StoreCredential) -> Result<StoreData, ShopifyError> {
        let (shop, products, orders) = tokio::try_join!(
            self.get_shop(credential),
            self.get_products(credential),
            self.get_orders(credential),
        )?;

        let data = StoreData {
            shop,
            products,
            orders,
        };
        data.validate()?;
        Ok(data)
    }
}

/// Deserialize the `field` member of a JSON object body.
fn take_field<T: DeserializeOwned>(body: &str, field: &str) -> Result<T, ShopifyError> {
    let mut value: serde_json::Value = serde_json::from_str(body)?;
    let member = value
        .get_mut(field)
        .map(serde_json::Value::take)
        .ok_or_else(|| DataFormatError::new(field, "missing from response"))?;
    Ok(serde_json::from_value(member)?)
}

/// Parse a next-page link, rejecting targets off the store's origin.
fn same_origin_url(target: &str, origin: &url::Origin) -> Result<Url, DataFormatError> {
    let url = Url::parse(target).map_err(|e| DataFormatError::new("link", e.to_string()))?;
    if &url.origin() != origin {
        return Err(DataFormatError::new(
            "link",
            format!("next page is off the store origin: {url}"),
        ));
    }
    Ok(url)
}

/// Extract the `rel="next"` target from a `Link` header.
fn next_page_url(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(ToString::to_string)
    })
}
