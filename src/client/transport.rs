use super::HttpClientConfig;
use crate::error::BoxError;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{Client, Request, StatusCode};
use std::fmt::Debug;
use tracing::{info, warn};

/// Streamed response body; an `Err` item means the body could not be read
pub type BodyStream = BoxStream<'static, std::result::Result<Bytes, BoxError>>;

/// Response head plus an unread body stream
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: BodyStream,
}

impl Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("body", &"BodyStream")
            .finish()
    }
}

/// Sends one fully-built HTTP request.
///
/// Implementations must be safe to share between concurrent calls and must not
/// retry on their own.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn execute(&self, request: Request) -> std::result::Result<TransportResponse, BoxError>;
}

/// `reqwest`-backed transport; the inner client pools connections
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            client_builder = client_builder.connect_timeout(connect_timeout);
        }

        // Configure proxy if provided
        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| Error::InvalidConfig {
                field: "proxy".to_string(),
                reason: format!("Invalid proxy URL: {e}"),
            })?;
            warn!("Routing tool requests through proxy {}", proxy_url);
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|e| Error::Service(format!("Failed to create HTTP client: {e}")))?;

        info!("Initialized HTTP transport (timeout: {:?})", config.timeout);
        Ok(Self { client })
    }

    /// Wrap an already configured client
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: Request) -> std::result::Result<TransportResponse, BoxError> {
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Box::new(e) as BoxError))
            .boxed();

        Ok(TransportResponse { status, body })
    }
}
