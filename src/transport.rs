// src/transport.rs

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::poll::request::RequestDescriptor;

/// Raw remote response: status plus undecoded body bytes. Decoding stays in
/// the engine so the transport needs no knowledge of the wire contract.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Executes one request. A returned error means the request never produced
/// a response (network failure, timeout, cancellation) and is always
/// treated as transient by the engine.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        (**self).execute(request).await
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let response = self
            .client
            .get(request.url())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .context("feed request")?;
        let status = response.status().as_u16();
        let body = response.bytes().await.context("feed response body")?.to_vec();
        Ok(RawResponse { status, body })
    }
}
