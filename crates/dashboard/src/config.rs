//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `DASHBOARD_HOST` - Bind address (default: 127.0.0.1)
//! - `DASHBOARD_PORT` - Listen port (default: 3000)
//! - `DASHBOARD_STORES_FILE` - JSON file holding connected store credentials
//!   (default: stores.json)
//! - `DASHBOARD_MAX_CONCURRENT_FETCHES` - Cap on concurrent store fetches
//!   (default: unbounded, one fetch per store)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2024-10)
//! - `SHOPIFY_PAGE_SIZE` - Records per page for products/orders (default: 250, max 250)
//! - `SHOPIFY_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: transport default)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2024-10";
const MAX_PAGE_SIZE: u32 = 250;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Dashboard application configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Path of the credential file
    pub stores_file: PathBuf,
    /// Maximum number of store fetches in flight (None = one per store)
    pub max_concurrent_fetches: Option<NonZeroUsize>,
    /// Upstream Admin API configuration
    pub shopify: ShopifyConfig,
    /// Emit JSON logs
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Upstream Admin REST API configuration.
///
/// Store URLs and access tokens are per store and live in the credential
/// store, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopifyConfig {
    /// API version path segment (e.g., 2024-10)
    pub api_version: String,
    /// Records requested per page
    pub page_size: u32,
    /// Per-request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: MAX_PAGE_SIZE,
            request_timeout: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let host = env.parsed_or("DASHBOARD_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parsed_or("DASHBOARD_PORT", 3000_u16)?;
        let stores_file = PathBuf::from(env.or_default("DASHBOARD_STORES_FILE", "stores.json"));
        let max_concurrent_fetches = env.parsed::<NonZeroUsize>("DASHBOARD_MAX_CONCURRENT_FETCHES")?;
        let shopify = ShopifyConfig::from_lookup(&env)?;
        let json_logs = env
            .optional("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));
        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env.parsed_or("SENTRY_SAMPLE_RATE", 1.0_f32)?;
        let sentry_traces_sample_rate = env.parsed_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?;

        Ok(Self {
            host,
            port,
            stores_file,
            max_concurrent_fetches,
            shopify,
            json_logs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    fn from_lookup<F>(env: &Env<'_, F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_size = env.parsed_or("SHOPIFY_PAGE_SIZE", MAX_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        let request_timeout = env
            .parsed::<u64>("SHOPIFY_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs);

        Ok(Self {
            api_version: env.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            page_size,
            request_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed accessors.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an optional variable.
    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    /// Parse a variable with a default value.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parsed(key)?.unwrap_or(default))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.stores_file, PathBuf::from("stores.json"));
        assert_eq!(config.max_concurrent_fetches, None);
        assert_eq!(config.shopify, ShopifyConfig::default());
        assert_eq!(config.shopify.api_version, "2024-10");
        assert!(!config.json_logs);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DASHBOARD_HOST", "0.0.0.0"),
            ("DASHBOARD_PORT", "8080"),
            ("DASHBOARD_STORES_FILE", "/var/lib/storefleet/stores.json"),
            ("DASHBOARD_MAX_CONCURRENT_FETCHES", "4"),
            ("SHOPIFY_API_VERSION", "2025-01"),
            ("SHOPIFY_PAGE_SIZE", "50"),
            ("SHOPIFY_REQUEST_TIMEOUT_SECS", "30"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.max_concurrent_fetches, NonZeroUsize::new(4));
        assert_eq!(config.shopify.api_version, "2025-01");
        assert_eq!(config.shopify.page_size, 50);
        assert_eq!(
            config.shopify.request_timeout,
            Some(Duration::from_secs(30))
        );
        assert!(config.json_logs);
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("DASHBOARD_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DASHBOARD_PORT"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = config_from(&[("DASHBOARD_MAX_CONCURRENT_FETCHES", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(config_from(&[("SHOPIFY_PAGE_SIZE", "0")]).is_err());
        assert!(config_from(&[("SHOPIFY_PAGE_SIZE", "251")]).is_err());
        assert!(config_from(&[("SHOPIFY_PAGE_SIZE", "250")]).is_ok());
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("DASHBOARD_PORT", "  ")]).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_env_var_display() {
        let err = config_from(&[("SHOPIFY_REQUEST_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid environment variable SHOPIFY_REQUEST_TIMEOUT_SECS: invalid digit found in string"
        );
    }
}
