//! Connected-store credential persistence.
//!
//! [`CredentialStore`] is the capability the dashboard and CLI use to keep
//! the list of connected stores. The fan-out never touches it; callers load
//! credentials here and pass them in.
//!
//! - [`JsonFileCredentialStore`] persists a JSON array of
//!   `{ "url", "accessToken" }` objects on disk
//! - [`MemoryCredentialStore`] keeps the list in process memory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use storefleet_core::{ConfigurationError, CredentialSet, StoreCredential, StoreUrl};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

/// Errors from credential persistence.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Reading or writing the backing file failed.
    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold a valid credential list.
    #[error("Credential file is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    /// A credential was rejected.
    #[error(transparent)]
    Config(#[from] ConfigurationError),
}

/// Load/save/connect/remove for the connected-store list.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All connected credentials, in connection order.
    async fn load(&self) -> Result<Vec<StoreCredential>, CredentialStoreError>;

    /// Replace the stored list.
    async fn save(&self, credentials: &[StoreCredential]) -> Result<(), CredentialStoreError>;

    /// Append new credentials, returning the full list.
    ///
    /// Rejects a URL that is already connected or repeated within
    /// `credentials` with `ConfigurationError::DuplicateStore`; nothing is
    /// saved in that case.
    async fn connect(
        &self,
        credentials: CredentialSet,
    ) -> Result<Vec<StoreCredential>, CredentialStoreError>;

    /// Disconnect a store. Returns whether it was connected.
    async fn remove(&self, url: &StoreUrl) -> Result<bool, CredentialStoreError>;
}

/// Append `incoming` to `existing`, rejecting duplicate URLs.
fn merge(
    mut existing: Vec<StoreCredential>,
    incoming: CredentialSet,
) -> Result<Vec<StoreCredential>, ConfigurationError> {
    for credential in incoming {
        if existing.iter().any(|c| c.url() == credential.url()) {
            return Err(ConfigurationError::DuplicateStore(
                credential.url().to_string(),
            ));
        }
        existing.push(credential);
    }
    Ok(existing)
}

// =============================================================================
// JSON file backend
// =============================================================================

/// Credential list stored as a JSON file.
///
/// A missing file is an empty list. Writes go to a sibling temp file that is
/// renamed over the original. A mutex serializes read-modify-write cycles
/// within this process.
#[derive(Debug)]
pub struct JsonFileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCredentialStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<StoreCredential>, CredentialStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, credentials: &[StoreCredential]) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(credentials)?;
        let tmp = self.path.with_extension("json.tmp");

        // Tokens are stored in plain text; keep the file owner-only
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&tmp).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for JsonFileCredentialStore {
    async fn load(&self) -> Result<Vec<StoreCredential>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    #[instrument(skip_all, fields(stores = credentials.len()))]
    async fn save(&self, credentials: &[StoreCredential]) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;
        self.write(credentials).await
    }

    #[instrument(skip_all, fields(stores = credentials.len()))]
    async fn connect(
        &self,
        credentials: CredentialSet,
    ) -> Result<Vec<StoreCredential>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let merged = merge(self.read().await?, credentials)?;
        self.write(&merged).await?;
        tracing::info!(path = %self.path.display(), total = merged.len(), "Stores connected");
        Ok(merged)
    }

    #[instrument(skip_all, fields(store_url = %url))]
    async fn remove(&self, url: &StoreUrl) -> Result<bool, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut credentials = self.read().await?;
        let before = credentials.len();
        credentials.retain(|c| c.url() != url);
        if credentials.len() == before {
            return Ok(false);
        }
        self.write(&credentials).await?;
        tracing::info!(path = %self.path.display(), "Store disconnected");
        Ok(true)
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Credential list held in memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<Vec<StoreCredential>>,
}

impl MemoryCredentialStore {
    /// Create a store pre-populated with `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Vec<StoreCredential>) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Vec<StoreCredential>, CredentialStoreError> {
        Ok(self.credentials.read().await.clone())
    }

    async fn save(&self, credentials: &[StoreCredential]) -> Result<(), CredentialStoreError> {
        *self.credentials.write().await = credentials.to_vec();
        Ok(())
    }

    async fn connect(
        &self,
        credentials: CredentialSet,
    ) -> Result<Vec<StoreCredential>, CredentialStoreError> {
        let mut guard = self.credentials.write().await;
        let merged = merge(guard.clone(), credentials)?;
        guard.clone_from(&merged);
        Ok(merged)
    }

    async fn remove(&self, url: &StoreUrl) -> Result<bool, CredentialStoreError> {
        let mut guard = self.credentials.write().await;
        let before = guard.len();
        guard.retain(|c| c.url() != url);
        Ok(guard.len() != before)
    }
}
