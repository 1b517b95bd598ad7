//! Business logic services.
//!
//! - [`fanout`] fetches many stores concurrently with all-or-nothing failure
//! - [`credentials`] persists the connected-store list

pub mod credentials;
pub mod fanout;

pub use credentials::{
    CredentialStore, CredentialStoreError, JsonFileCredentialStore, MemoryCredentialStore,
};
pub use fanout::{FanOut, FanOutError, FetchFailure};
