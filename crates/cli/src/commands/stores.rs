//! Connected-store management commands.

use storefleet_core::{StoreCredential, StoreUrl};
use storefleet_dashboard::services::CredentialStore;

use super::CliError;

/// URLs of every connected store.
pub async fn list(store: &dyn CredentialStore) -> Result<Vec<StoreUrl>, CliError> {
    let credentials = store.load().await?;
    Ok(credentials.iter().map(|c| c.url().clone()).collect())
}

/// Connect a store. Returns the number of connected stores afterwards.
pub async fn add(store: &dyn CredentialStore, url: &str, token: &str) -> Result<usize, CliError> {
    let credential = StoreCredential::new(url, token)?;
    let all = store.connect(credential.into()).await?;
    Ok(all.len())
}

/// Disconnect a store.
pub async fn remove(store: &dyn CredentialStore, url: &str) -> Result<(), CliError> {
    let url = StoreUrl::parse(url)?;
    if store.remove(&url).await? {
        Ok(())
    } else {
        Err(CliError::NotConnected(url.to_string()))
    }
}
