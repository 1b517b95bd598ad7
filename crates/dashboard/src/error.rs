//! Unified error handling for the dashboard service.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use storefleet_core::{ConfigurationError, DataFormatError};
use thiserror::Error;

use crate::services::{CredentialStoreError, FanOutError, FetchFailure};
use crate::shopify::ShopifyError;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// A store fetch failed during fan-out.
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// A single-store upstream call failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] ShopifyError),

    /// Fetched data could not be aggregated.
    #[error("Data error: {0}")]
    Data(#[from] DataFormatError),

    /// Credential was missing, malformed or already connected.
    #[error("{0}")]
    Config(#[from] ConfigurationError),

    /// Credential persistence failed.
    #[error("Credential store error: {0}")]
    Store(CredentialStoreError),

    /// The request was abandoned before the fetch completed.
    #[error("Request cancelled")]
    Cancelled,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<CredentialStoreError> for AppError {
    fn from(err: CredentialStoreError) -> Self {
        match err {
            CredentialStoreError::Config(e) => Self::Config(e),
            other => Self::Store(other),
        }
    }
}

impl From<FanOutError> for AppError {
    fn from(err: FanOutError) -> Self {
        match err {
            FanOutError::Fetch(failure) => Self::Fetch(failure),
            FanOutError::Cancelled => Self::Cancelled,
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Fetch(_) | Self::Upstream(_) | Self::Data(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() && !matches!(self, Self::Cancelled) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
