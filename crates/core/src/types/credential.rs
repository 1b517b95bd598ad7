//! Store credential types.
//!
//! A [`StoreCredential`] pairs a store URL with its Admin API access token.
//! The URL is the identity key of a credential; the token is never printed.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigurationError;

/// Store URL (e.g., `my-store.myshopify.com`).
///
/// Trimmed and guaranteed non-empty. Scheme and host are lowercased, so
/// case variants of one store compare equal. A URL may carry an explicit
/// `http://` or `https://` scheme; without one, `https` is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoreUrl(String);

impl StoreUrl {
    /// Parse and validate a store URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingUrl` if the value is blank and
    /// `ConfigurationError::InvalidUrl` if it contains whitespace.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ConfigurationError> {
        let trimmed = value.as_ref().trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigurationError::MissingUrl);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ConfigurationError::InvalidUrl(
                trimmed.to_string(),
                "must not contain whitespace".to_string(),
            ));
        }
        Ok(Self(normalize(trimmed)))
    }

    /// Get the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base URL for HTTP requests against this store.
    ///
    /// Bare hosts are prefixed with `https://`.
    #[must_use]
    pub fn origin(&self) -> String {
        if self.0.starts_with("http://") || self.0.starts_with("https://") {
            self.0.clone()
        } else {
            format!("https://{}", self.0)
        }
    }
}

/// Lowercase everything before the first path segment.
fn normalize(value: &str) -> String {
    let (scheme, rest) = match value.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_ascii_lowercase()), rest),
        None => (None, value),
    };
    let (host, path) = rest.find('/').map_or((rest, ""), |at| rest.split_at(at));
    let host = host.to_ascii_lowercase();
    match scheme {
        Some(scheme) => format!("{scheme}://{host}{path}"),
        None => format!("{host}{path}"),
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoreUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StoreUrl {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StoreUrl> for String {
    fn from(url: StoreUrl) -> Self {
        url.0
    }
}

/// Admin API access token for one store.
///
/// Held as a [`SecretString`], so `Debug` output is redacted. Serializes as
/// the plain token for the credential file and gateway request bodies.
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Create a new access token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Whether the token is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }
}

impl ExposeSecret<str> for AccessToken {
    fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl Eq for AccessToken {}

impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose_secret())
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// A store URL with its access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCredential {
    url: StoreUrl,
    access_token: AccessToken,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStoreCredential {
    url: StoreUrl,
    #[serde(default)]
    access_token: Option<String>,
}

impl<'de> Deserialize<'de> for StoreCredential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawStoreCredential::deserialize(deserializer)?;
        Self::from_parts(raw.url, AccessToken::new(raw.access_token.unwrap_or_default()))
            .map_err(serde::de::Error::custom)
    }
}

impl StoreCredential {
    /// Create a validated credential.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the URL or token is blank.
    pub fn new(
        url: impl AsRef<str>,
        access_token: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        Self::from_parts(StoreUrl::parse(url)?, AccessToken::new(access_token))
    }

    fn from_parts(url: StoreUrl, access_token: AccessToken) -> Result<Self, ConfigurationError> {
        if access_token.is_blank() {
            return Err(ConfigurationError::MissingAccessToken(url.to_string()));
        }
        Ok(Self { url, access_token })
    }

    /// The store URL (identity key).
    #[must_use]
    pub const fn url(&self) -> &StoreUrl {
        &self.url
    }

    /// The store's access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}

/// An ordered collection of credentials.
///
/// Built from a single credential or a sequence; the JSON form accepts
/// either an object or an array of objects. Order is preserved and
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CredentialSet(Vec<StoreCredential>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<StoreCredential>),
    One(StoreCredential),
}

impl<'de> Deserialize<'de> for CredentialSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::Many(credentials) => Self(credentials),
            OneOrMany::One(credential) => Self(vec![credential]),
        })
    }
}

impl CredentialSet {
    /// Number of credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the credentials in order.
    pub fn iter(&self) -> std::slice::Iter<'_, StoreCredential> {
        self.0.iter()
    }

    /// URLs that appear more than once, in first-repeat order.
    #[must_use]
    pub fn duplicate_urls(&self) -> Vec<&StoreUrl> {
        let mut duplicates: Vec<&StoreUrl> = Vec::new();
        for (index, credential) in self.0.iter().enumerate() {
            let url = credential.url();
            let seen_before = self.0.iter().take(index).any(|c| c.url() == url);
            if seen_before && !duplicates.contains(&url) {
                duplicates.push(url);
            }
        }
        duplicates
    }
}

impl From<StoreCredential> for CredentialSet {
    fn from(credential: StoreCredential) -> Self {
        Self(vec![credential])
    }
}

impl From<Vec<StoreCredential>> for CredentialSet {
    fn from(credentials: Vec<StoreCredential>) -> Self {
        Self(credentials)
    }
}

impl From<&[StoreCredential]> for CredentialSet {
    fn from(credentials: &[StoreCredential]) -> Self {
        Self(credentials.to_vec())
    }
}

impl FromIterator<StoreCredential> for CredentialSet {
    fn from_iter<I: IntoIterator<Item = StoreCredential>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CredentialSet {
    type Item = StoreCredential;
    type IntoIter = std::vec::IntoIter<StoreCredential>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CredentialSet {
    type Item = &'a StoreCredential;
    type IntoIter = std::slice::Iter<'a, StoreCredential>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cred(url: &str) -> StoreCredential {
        StoreCredential::new(url, "shpat_token").unwrap()
    }

    #[test]
    fn test_store_url_trims_and_strips_trailing_slash() {
        let url = StoreUrl::parse("  shop-a.myshopify.com/ ").unwrap();
        assert_eq!(url.as_str(), "shop-a.myshopify.com");
    }

    #[test]
    fn test_store_url_lowercases_host() {
        assert_eq!(
            StoreUrl::parse("Shop-A.MyShopify.com").unwrap(),
            StoreUrl::parse("shop-a.myshopify.com").unwrap()
        );
        assert_eq!(
            StoreUrl::parse("HTTP://LocalHost:8080/Proxy/").unwrap().as_str(),
            "http://localhost:8080/Proxy"
        );
    }

    #[test]
    fn test_store_url_rejects_blank() {
        assert_eq!(StoreUrl::parse("   "), Err(ConfigurationError::MissingUrl));
    }

    #[test]
    fn test_store_url_rejects_whitespace() {
        assert!(matches!(
            StoreUrl::parse("shop a.myshopify.com"),
            Err(ConfigurationError::InvalidUrl(_, _))
        ));
    }

    #[test]
    fn test_store_url_origin() {
        assert_eq!(
            StoreUrl::parse("shop-a.myshopify.com").unwrap().origin(),
            "https://shop-a.myshopify.com"
        );
        assert_eq!(
            StoreUrl::parse("http://127.0.0.1:8080").unwrap().origin(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_credential_requires_token() {
        let err = StoreCredential::new("shop-a.myshopify.com", "  ").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingAccessToken("shop-a.myshopify.com".to_string())
        );
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let debug = format!("{:?}", cred("shop-a.myshopify.com"));
        assert!(!debug.contains("shpat_token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_credential_json_uses_camel_case() {
        let json = serde_json::to_value(cred("shop-a.myshopify.com")).unwrap();
        assert_eq!(json["url"], "shop-a.myshopify.com");
        assert_eq!(json["accessToken"], "shpat_token");
    }

    #[test]
    fn test_credential_deserialize_missing_url_fails() {
        let result: Result<StoreCredential, _> =
            serde_json::from_str(r#"{"url": "", "accessToken": "t"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_credential_deserialize_missing_token_fails() {
        let result: Result<StoreCredential, _> =
            serde_json::from_str(r#"{"url": "shop-a.myshopify.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_credential_set_accepts_single_object() {
        let set: CredentialSet =
            serde_json::from_str(r#"{"url": "shop-a.myshopify.com", "accessToken": "t"}"#)
                .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_credential_set_accepts_array() {
        let set: CredentialSet = serde_json::from_str(
            r#"[{"url": "a.myshopify.com", "accessToken": "t"},
                {"url": "b.myshopify.com", "accessToken": "u"}]"#,
        )
        .unwrap();
        let urls: Vec<&str> = set.iter().map(|c| c.url().as_str()).collect();
        assert_eq!(urls, vec!["a.myshopify.com", "b.myshopify.com"]);
    }

    #[test]
    fn test_scalar_wraps_into_single_element_set() {
        let single = CredentialSet::from(cred("a.myshopify.com"));
        let many = CredentialSet::from(vec![cred("a.myshopify.com")]);
        assert_eq!(single, many);
    }

    #[test]
    fn test_duplicate_urls_detected() {
        let set = CredentialSet::from(vec![
            cred("a.myshopify.com"),
            cred("b.myshopify.com"),
            cred("a.myshopify.com"),
            cred("a.myshopify.com"),
        ]);
        let duplicates: Vec<&str> = set.duplicate_urls().iter().map(|u| u.as_str()).collect();
        assert_eq!(duplicates, vec!["a.myshopify.com"]);
    }

    #[test]
    fn test_duplicate_urls_ignore_host_case() {
        let set = CredentialSet::from(vec![cred("a.myshopify.com"), cred("A.myshopify.COM")]);
        assert_eq!(set.duplicate_urls().len(), 1);
    }
}
