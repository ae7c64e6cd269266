//! Scripted-failure endpoint wrapper
//!
//! Fails each operation a configured number of times with a given status
//! before delegating to the wrapped endpoint. Used to exercise retry
//! budgets without a misbehaving server.

use async_trait::async_trait;
use ferry_endpoint::{EndpointError, StorageEndpoint};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

/// Endpoint operation a scripted failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointOp {
    List,
    Fetch,
    Push,
    Remove,
}

/// Wraps an endpoint and injects failures before delegating.
pub struct FlakyEndpoint<E> {
    inner: E,
    scripted: Mutex<HashMap<EndpointOp, (u16, u32)>>,
}

impl<E: StorageEndpoint> FlakyEndpoint<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            scripted: Mutex::new(HashMap::new()),
        }
    }

    /// Fail `op` with `code`, `times` times, before delegating.
    #[must_use]
    pub fn fail_times(self, op: EndpointOp, code: u16, times: u32) -> Self {
        self.scripted.lock().insert(op, (code, times));
        self
    }

    fn take_failure(&self, op: EndpointOp) -> Option<EndpointError> {
        let mut scripted = self.scripted.lock();
        match scripted.get_mut(&op) {
            Some((code, remaining)) if *remaining > 0 => {
                *remaining -= 1;
                Some(EndpointError::status(*code))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl<E: StorageEndpoint> StorageEndpoint for FlakyEndpoint<E> {
    async fn list(&self) -> Result<Vec<String>, EndpointError> {
        match self.take_failure(EndpointOp::List) {
            Some(e) => Err(e),
            None => self.inner.list().await,
        }
    }

    async fn fetch(&self, name: &str, dest: &Path) -> Result<(), EndpointError> {
        match self.take_failure(EndpointOp::Fetch) {
            Some(e) => Err(e),
            None => self.inner.fetch(name, dest).await,
        }
    }

    async fn push(&self, local: &Path) -> Result<(), EndpointError> {
        match self.take_failure(EndpointOp::Push) {
            Some(e) => Err(e),
            None => self.inner.push(local).await,
        }
    }

    async fn remove(&self, name: &str) -> Result<(), EndpointError> {
        match self.take_failure(EndpointOp::Remove) {
            Some(e) => Err(e),
            None => self.inner.remove(name).await,
        }
    }
}
