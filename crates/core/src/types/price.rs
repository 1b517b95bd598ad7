//! Decimal amounts as they arrive from the commerce platform.
//!
//! Upstream prices are sent either as decimal strings (`"19.99"`) or, in
//! some payloads, as bare JSON numbers. Both are kept verbatim until read so
//! that a malformed value surfaces as a [`DataFormatError`] at the point of
//! use instead of silently becoming zero.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DataFormatError;

/// Parse a base-10 decimal string.
///
/// # Errors
///
/// Returns a `DataFormatError` naming `field` if `raw` is not a decimal.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, DataFormatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DataFormatError::new(field, "empty value"));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| DataFormatError::new(field, format!("not a decimal: {raw}")))
}

/// An amount as sent upstream: a decimal string or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// Decimal string (preserves precision).
    Text(String),
    /// Bare JSON number.
    Number(serde_json::Number),
}

impl Amount {
    /// Read the amount as a decimal.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` naming `field` if the value is not a decimal.
    pub fn to_decimal(&self, field: &str) -> Result<Decimal, DataFormatError> {
        match self {
            Self::Text(text) => parse_decimal(field, text),
            Self::Number(number) => parse_decimal(field, &number.to_string()),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Format a decimal as a dollar amount with two fractional digits.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}
