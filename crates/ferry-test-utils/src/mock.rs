//! mockall mock of the storage endpoint capability

use async_trait::async_trait;
use ferry_endpoint::{EndpointError, StorageEndpoint};
use std::path::Path;

mockall::mock! {
    /// Fully scripted storage endpoint.
    pub Endpoint {}

    #[async_trait]
    impl StorageEndpoint for Endpoint {
        async fn list(&self) -> Result<Vec<String>, EndpointError>;
        async fn fetch(&self, name: &str, dest: &Path) -> Result<(), EndpointError>;
        async fn push(&self, local: &Path) -> Result<(), EndpointError>;
        async fn remove(&self, name: &str) -> Result<(), EndpointError>;
    }
}
