//! Storage endpoint capability for ferry
//!
//! Defines the four-operation capability every remote storage must expose:
//! - enumerate record names
//! - fetch a record's bytes into a local path
//! - push a local file as a record
//! - remove a record by name
//!
//! The HTTP implementation lives in [`http`]; both the source and the
//! destination storage use it and differ only in their base URL.

pub mod error;
pub mod http;

pub use error::EndpointError;
pub use http::HttpEndpoint;

use async_trait::async_trait;
use std::path::Path;

/// Capability interface of a remote record store.
///
/// Implementations report failures as [`EndpointError`]; a non-success
/// protocol status surfaces as [`EndpointError::Status`] so callers can
/// recognize conflict (409) and not-found (404) responses. Everything else
/// is a generic transient failure to the retry layer above.
#[async_trait]
pub trait StorageEndpoint: Send + Sync {
    /// Return every record name currently present in the store.
    async fn list(&self) -> Result<Vec<String>, EndpointError>;

    /// Write the named record's full byte content to `dest`.
    ///
    /// On any failure a partially written local file must be removed
    /// before the error is returned.
    async fn fetch(&self, name: &str, dest: &Path) -> Result<(), EndpointError>;

    /// Submit the file at `local` as a record.
    ///
    /// The store derives the record's identity from the local file name.
    async fn push(&self, local: &Path) -> Result<(), EndpointError>;

    /// Delete the named record.
    async fn remove(&self, name: &str) -> Result<(), EndpointError>;
}
