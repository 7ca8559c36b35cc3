use super::HttpTransport;
use crate::error::BoxError;
use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Body, Method, Request};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

/// Runs a single HTTP exchange: send once, read the whole body, no retries.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    transport: Arc<dyn HttpTransport>,
    timeout: Option<Duration>,
}

impl HttpExecutor {
    /// `timeout` is the limit the transport enforces; it is only used to
    /// report [`Error::Timeout`].
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Option<Duration>) -> Self {
        Self { transport, timeout }
    }

    /// Build a request without performing any I/O.
    ///
    /// Malformed URLs and header names or values fail with
    /// [`Error::RequestBuild`].
    pub fn build_request(
        method: Method,
        url: &str,
        headers: &HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> Result<Request> {
        let url = Url::parse(url).map_err(|e| Error::RequestBuild(Box::new(e)))?;
        let mut request = Request::new(method, url);

        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::RequestBuild(Box::new(e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::RequestBuild(Box::new(e)))?;
            request.headers_mut().append(name, value);
        }

        if let Some(body) = body {
            *request.body_mut() = Some(Body::from(body));
        }

        Ok(request)
    }

    /// Send `request` once and return the complete response body.
    ///
    /// The status code is not interpreted. Dropping the in-flight future on
    /// cancellation also drops the body stream.
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub async fn execute(
        &self,
        request: Request,
        cancellation: &CancellationToken,
    ) -> Result<Bytes> {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tokio::select! {
            biased;
            () = cancellation.cancelled() => {
                debug!("Call cancelled before completion");
                Err(Error::Cancelled)
            }
            result = self.send_and_read(request) => result,
        }
    }

    async fn send_and_read(&self, request: Request) -> Result<Bytes> {
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| self.classify(e, Error::Transport))?;

        debug!("Received response with status {}", response.status);

        let mut body = response.body;
        let mut buffer = BytesMut::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| self.classify(e, Error::ReadBody))?;
            buffer.extend_from_slice(&chunk);
        }

        debug!("Read {} response bytes", buffer.len());
        Ok(buffer.freeze())
    }

    fn classify(&self, err: BoxError, otherwise: fn(BoxError) -> Error) -> Error {
        let timed_out = err
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout);

        if timed_out {
            Error::Timeout {
                timeout: self.timeout,
            }
        } else {
            otherwise(err)
        }
    }
}
