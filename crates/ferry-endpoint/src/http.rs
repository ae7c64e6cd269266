//! HTTP implementation of the storage endpoint capability
//!
//! Wire protocol of the storage services:
//! - `GET {base}` returns a JSON array of record names
//! - `GET {base}/{name}` returns the record's bytes
//! - `POST {base}` accepts a multipart form with a single `file` part
//! - `DELETE {base}/{name}` removes the record
//!
//! Only status 200 counts as success; every other status is reported as
//! [`EndpointError::Status`] and left to the retry layer to interpret.

use crate::{EndpointError, StorageEndpoint};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Connection pool ceiling per endpoint.
const MAX_IDLE_CONNECTIONS: usize = 100;

/// Storage endpoint reached over HTTP.
///
/// Source and destination stores share this implementation and differ
/// only in `base`, the URL under which the record collection lives.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    base: String,
    client: Client,
}

impl HttpEndpoint {
    /// Create an endpoint client for the collection at `base`.
    pub fn new(base: impl Into<String>) -> Result<Self, EndpointError> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .build()?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Base URL of the record collection.
    #[inline]
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn record_url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    fn check_status(response: Response) -> Result<Response, EndpointError> {
        let status = response.status();
        tracing::debug!(url = %response.url(), code = status.as_u16(), "endpoint response");
        if status == StatusCode::OK {
            Ok(response)
        } else {
            Err(EndpointError::status(status.as_u16()))
        }
    }

    async fn write_body(response: Response, dest: &Path) -> Result<(), EndpointError> {
        let mut file = tokio::fs::File::create(dest).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl StorageEndpoint for HttpEndpoint {
    async fn list(&self) -> Result<Vec<String>, EndpointError> {
        let response = self.client.get(&self.base).send().await?;
        let response = Self::check_status(response)?;
        Ok(response.json().await?)
    }

    async fn fetch(&self, name: &str, dest: &Path) -> Result<(), EndpointError> {
        let response = self.client.get(self.record_url(name)).send().await?;
        let response = Self::check_status(response)?;
        match Self::write_body(response, dest).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // never leave a partially written record behind
                let _ = tokio::fs::remove_file(dest).await;
                Err(e)
            }
        }
    }

    async fn push(&self, local: &Path) -> Result<(), EndpointError> {
        let name = local
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                EndpointError::from(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("local path {} has no usable file name", local.display()),
                ))
            })?
            .to_owned();
        let bytes = tokio::fs::read(local).await?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name(name));
        let response = self
            .client
            .post(&self.base)
            .header(ACCEPT, "*/*")
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).map(|_| ())
    }

    async fn remove(&self, name: &str) -> Result<(), EndpointError> {
        let response = self
            .client
            .delete(self.record_url(name))
            .header(ACCEPT, "*/*")
            .send()
            .await?;
        Self::check_status(response).map(|_| ())
    }
}
