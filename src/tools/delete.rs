use super::{parameters_schema, parse_arguments, Tool, ToolInfo};
use crate::client::{HttpClientConfig, HttpExecutor, HttpTransport, ReqwestTransport};
use crate::config::duration_secs;
use crate::Result;
use async_trait::async_trait;
use reqwest::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

pub const DEFAULT_TOOL_NAME: &str = "requests_delete";
pub const DEFAULT_TOOL_DESC: &str = "A portal to the internet. \
Use this when you need to make a DELETE request to a URL. \
Input should be a specific url, and the output will be the text response of the DELETE request.";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration of the HTTP DELETE tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteConfig {
    /// Expose the tool to agents (default: true)
    pub enabled: bool,
    /// Tool name advertised to callers (default: `requests_delete`)
    pub tool_name: String,
    /// Tool description advertised to callers
    pub tool_desc: String,
    /// HTTP headers sent with every request
    pub headers: HashMap<String, String>,
    /// Per-request timeout in seconds (default: 30)
    #[serde(
        rename = "timeout_secs",
        with = "duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tool_name: String::new(),
            tool_desc: String::new(),
            headers: HashMap::new(),
            timeout: None,
        }
    }
}

impl DeleteConfig {
    /// Fill unset fields with defaults. Nothing here can fail today.
    pub fn validate(&mut self) -> Result<()> {
        if self.tool_name.is_empty() {
            self.tool_name = DEFAULT_TOOL_NAME.to_string();
        }

        if self.tool_desc.is_empty() {
            self.tool_desc = DEFAULT_TOOL_DESC.to_string();
        }

        if self.timeout.is_none() {
            self.timeout = Some(DEFAULT_TIMEOUT);
        }

        Ok(())
    }
}

/// Arguments accepted by the DELETE tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeleteRequest {
    /// The URL to send the DELETE request to.
    pub url: String,
}

/// HTTP DELETE tool returning the raw response body
#[derive(Debug, Clone)]
pub struct DeleteTool {
    config: Arc<DeleteConfig>,
    executor: HttpExecutor,
}

impl DeleteTool {
    pub fn new(mut config: DeleteConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&HttpClientConfig::with_timeout(config.timeout))?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        mut config: DeleteConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        config.validate()?;
        info!("Initializing {} tool", config.tool_name);

        let executor = HttpExecutor::new(transport, config.timeout);
        Ok(Self {
            config: Arc::new(config),
            executor,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DeleteConfig {
        &self.config
    }

    /// Send a DELETE to `request.url`.
    ///
    /// The body is returned whatever the status code; invalid UTF-8 is
    /// replaced rather than rejected.
    #[instrument(skip(self, cancellation), fields(tool = %self.config.tool_name))]
    pub async fn delete(
        &self,
        request: DeleteRequest,
        cancellation: &CancellationToken,
    ) -> Result<String> {
        let http_request =
            HttpExecutor::build_request(Method::DELETE, &request.url, &self.config.headers, None)?;
        let bytes = self.executor.execute(http_request, cancellation).await?;

        debug!("DELETE {} returned {} bytes", request.url, bytes.len());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl Tool for DeleteTool {
    fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.config.tool_name.clone(),
            description: self.config.tool_desc.clone(),
            parameters: parameters_schema::<DeleteRequest>(),
        }
    }

    async fn invoke(&self, arguments: &str, cancellation: &CancellationToken) -> Result<String> {
        let request: DeleteRequest = parse_arguments(&self.config.tool_name, arguments)?;
        self.delete(request, cancellation).await
    }
}
