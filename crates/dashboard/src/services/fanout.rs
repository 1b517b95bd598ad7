//! Concurrent multi-store fetch.
//!
//! [`FanOut::fetch_all`] issues one [`StoreFetcher`] call per credential
//! without waiting for earlier ones, then joins on all of them. Results are
//! written into index-aligned slots, so the output order always matches the
//! input order regardless of which store answers first.
//!
//! The policy is all-or-nothing: the first failure to complete aborts the
//! whole operation. Dropping the join drops every in-flight request, so no
//! further upstream work happens once a failure (or a cancellation) is seen.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use storefleet_core::{CredentialSet, StoreCredential, StoreDataBundle, StoreUrl};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::shopify::{ShopifyError, StoreFetcher};

/// One store's fetch failed, failing the whole fan-out.
#[derive(Debug, Error)]
#[error("Failed to fetch store data for {store_url}: {cause}")]
pub struct FetchFailure {
    /// Store whose fetch failed.
    pub store_url: StoreUrl,
    /// Underlying upstream error.
    #[source]
    pub cause: ShopifyError,
}

/// Errors from a cancellable fan-out.
#[derive(Debug, Error)]
pub enum FanOutError {
    /// A store fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// The caller abandoned the operation.
    #[error("Store fetch cancelled")]
    Cancelled,
}

/// Fetches many stores concurrently through one [`StoreFetcher`].
#[derive(Clone)]
pub struct FanOut {
    fetcher: Arc<dyn StoreFetcher>,
    max_concurrency: Option<NonZeroUsize>,
}

impl FanOut {
    /// Create a fan-out with one concurrent fetch per store.
    #[must_use]
    pub fn new(fetcher: Arc<dyn StoreFetcher>) -> Self {
        Self {
            fetcher,
            max_concurrency: None,
        }
    }

    /// Cap the number of fetches in flight. `None` means one per store.
    #[must_use]
    pub const fn with_max_concurrency(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Fetch every store in `credentials`.
    ///
    /// Accepts a single credential or a sequence. An empty set returns an
    /// empty list without issuing any calls. Duplicate URLs are fetched once
    /// per occurrence.
    ///
    /// # Errors
    ///
    /// Returns the first `FetchFailure` to complete. Results of stores that
    /// succeeded are discarded and in-flight fetches are cancelled.
    #[instrument(skip_all, fields(stores = tracing::field::Empty))]
    pub async fn fetch_all(
        &self,
        credentials: impl Into<CredentialSet>,
    ) -> Result<Vec<StoreDataBundle>, FetchFailure> {
        let credentials = credentials.into();
        let total = credentials.len();
        tracing::Span::current().record("stores", total);

        if credentials.is_empty() {
            return Ok(Vec::new());
        }

        let duplicates = credentials.duplicate_urls();
        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, "Duplicate store URLs will be fetched more than once");
        }

        let started = Instant::now();
        let width = self.max_concurrency.map_or(total, NonZeroUsize::get);

        let mut slots: Vec<Option<StoreDataBundle>> =
            std::iter::repeat_with(|| None).take(total).collect();
        let mut queue = credentials.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();

        for (index, credential) in queue.by_ref().take(width) {
            in_flight.push(self.fetch_one(index, credential));
        }

        while let Some((index, result)) = in_flight.next().await {
            let bundle = result?;
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(bundle);
            }
            if let Some((index, credential)) = queue.next() {
                in_flight.push(self.fetch_one(index, credential));
            }
        }

        let bundles: Vec<StoreDataBundle> = slots.into_iter().flatten().collect();
        tracing::info!(
            stores = bundles.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Fetched all stores"
        );
        Ok(bundles)
    }

    /// Like [`fetch_all`](Self::fetch_all), but stops when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `FanOutError::Cancelled` if the token is (or becomes)
    /// cancelled before the join completes, otherwise as `fetch_all`.
    pub async fn fetch_all_cancellable(
        &self,
        credentials: impl Into<CredentialSet>,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoreDataBundle>, FanOutError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!("Store fetch cancelled");
                Err(FanOutError::Cancelled)
            }
            result = self.fetch_all(credentials) => result.map_err(FanOutError::from),
        }
    }

    async fn fetch_one(
        &self,
        index: usize,
        credential: StoreCredential,
    ) -> (usize, Result<StoreDataBundle, FetchFailure>) {
        let store_url = credential.url().clone();
        let result = match self.fetcher.fetch_store(&credential).await {
            Ok(data) => Ok(data.into_bundle(store_url)),
            Err(cause) => {
                tracing::warn!(store_url = %store_url, error = %cause, "Store fetch failed");
                Err(FetchFailure { store_url, cause })
            }
        };
        (index, result)
    }
}
