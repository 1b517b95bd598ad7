//! Errors raised by the core types.

use thiserror::Error;

/// A record violated the expected shape.
///
/// Raised when an upstream payload or a caller-built record cannot be read
/// the way the aggregator and views need it (for example a `total_price`
/// that is not a base-10 decimal, or a product without variants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {reason}")]
pub struct DataFormatError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable description of the violation.
    pub reason: String,
}

impl DataFormatError {
    /// Create a new data format error.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Store credential entries that are empty or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The store URL is missing or blank.
    #[error("Store URL is required")]
    MissingUrl,

    /// The store URL contains characters that cannot appear in a host.
    #[error("Invalid store URL {0}: {1}")]
    InvalidUrl(String, String),

    /// The access token is missing or blank.
    #[error("Access token is required for store {0}")]
    MissingAccessToken(String),

    /// The store is already connected.
    #[error("Store already connected: {0}")]
    DuplicateStore(String),
}
