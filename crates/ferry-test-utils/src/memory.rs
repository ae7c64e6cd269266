//! In-memory storage endpoint
//!
//! Behaves like the real record stores: pushing an existing record is a
//! conflict (409), fetching or removing an absent one is not-found (404).

use async_trait::async_trait;
use ferry_endpoint::{EndpointError, StorageEndpoint};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Record store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEndpoint {
    records: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with named records.
    pub fn with_records<I, N, B>(records: I) -> Self
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: Into<Vec<u8>>,
    {
        let endpoint = Self::new();
        for (name, bytes) in records {
            endpoint.insert(name, bytes);
        }
        endpoint
    }

    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.records.lock().insert(name.into(), bytes.into());
    }

    pub fn names(&self) -> Vec<String> {
        self.records.lock().keys().cloned().collect()
    }

    pub fn content(&self, name: &str) -> Option<Vec<u8>> {
        self.records.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl StorageEndpoint for MemoryEndpoint {
    async fn list(&self) -> Result<Vec<String>, EndpointError> {
        Ok(self.names())
    }

    async fn fetch(&self, name: &str, dest: &Path) -> Result<(), EndpointError> {
        let Some(bytes) = self.content(name) else {
            return Err(EndpointError::status(404));
        };
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }

    async fn push(&self, local: &Path) -> Result<(), EndpointError> {
        let name = local
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                EndpointError::from(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "local path has no usable file name",
                ))
            })?
            .to_owned();
        let bytes = tokio::fs::read(local).await?;
        let mut records = self.records.lock();
        if records.contains_key(&name) {
            return Err(EndpointError::status(409));
        }
        records.insert(name, bytes);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), EndpointError> {
        match self.records.lock().remove(name) {
            Some(_) => Ok(()),
            None => Err(EndpointError::status(404)),
        }
    }
}
