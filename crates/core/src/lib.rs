//! Storefleet Core - Shared types and aggregation.
//!
//! This crate provides the data model used across all Storefleet components:
//! - `dashboard` - HTTP service, upstream client and fetch fan-out
//! - `cli` - Command-line tools for managing stores and printing summaries
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Store credentials, upstream records, bundles and summaries
//! - [`aggregate`] - Cross-store fold producing [`AggregateSummary`]
//! - [`error`] - Data-shape and configuration errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod error;
pub mod types;

pub use aggregate::aggregate;
pub use error::{ConfigurationError, DataFormatError};
pub use types::*;
