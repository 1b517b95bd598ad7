//! CLI command implementations.

pub mod fetch;
pub mod stores;

use storefleet_core::{ConfigurationError, DataFormatError};
use storefleet_dashboard::config::ConfigError;
use storefleet_dashboard::services::{CredentialStoreError, FanOutError};
use storefleet_dashboard::shopify::ShopifyError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Environment configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A credential argument was rejected.
    #[error(transparent)]
    Credential(#[from] ConfigurationError),

    /// The credential file could not be read or written.
    #[error(transparent)]
    Store(#[from] CredentialStoreError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ShopifyError),

    /// A store fetch failed or was interrupted.
    #[error(transparent)]
    Fetch(#[from] FanOutError),

    /// Fetched data could not be summarized.
    #[error(transparent)]
    Data(#[from] DataFormatError),

    /// The store is not connected.
    #[error("Store not connected: {0}")]
    NotConnected(String),
}
