//! Application state shared across handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::DashboardConfig;
use crate::services::{CredentialStore, FanOut, JsonFileCredentialStore};
use crate::shopify::{ShopifyError, StoreClient, StoreFetcher};

/// Application state shared across all handlers.
///
/// Cheap to clone: everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    credentials: Arc<dyn CredentialStore>,
    fetcher: Arc<dyn StoreFetcher>,
    fan_out: FanOut,
    shutdown: CancellationToken,
}

impl AppState {
    /// Build state from configuration: an Admin API client and a JSON file
    /// credential store at `config.stores_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DashboardConfig) -> Result<Self, ShopifyError> {
        let fetcher = Arc::new(StoreClient::new(&config.shopify)?);
        let credentials = Arc::new(JsonFileCredentialStore::new(config.stores_file.clone()));
        Ok(Self::with_parts(config, credentials, fetcher))
    }

    /// Build state from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        config: DashboardConfig,
        credentials: Arc<dyn CredentialStore>,
        fetcher: Arc<dyn StoreFetcher>,
    ) -> Self {
        let fan_out =
            FanOut::new(Arc::clone(&fetcher)).with_max_concurrency(config.max_concurrent_fetches);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                credentials,
                fetcher,
                fan_out,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Get the credential store.
    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.inner.credentials.as_ref()
    }

    /// Get the single-store fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &dyn StoreFetcher {
        self.inner.fetcher.as_ref()
    }

    /// Get the multi-store fan-out.
    #[must_use]
    pub fn fan_out(&self) -> &FanOut {
        &self.inner.fan_out
    }

    /// Root cancellation token, cancelled on server shutdown.
    #[must_use]
    pub fn shutdown(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}
