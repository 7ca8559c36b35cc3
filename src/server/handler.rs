use crate::tools::{DeleteTool, TavilySearchTool, Tool, ToolInfo};
use crate::{Config, Error, Result};
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    ErrorData, ServerHandler,
};
use std::{future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

const INSTRUCTIONS: &str =
    "Web tools for agents: search the web with Tavily and send HTTP DELETE requests.";

/// MCP server handler routing tool calls to the configured tools
#[derive(Debug, Clone)]
pub struct WebToolsServerHandler {
    tools: Arc<Vec<Arc<dyn Tool>>>,
}

impl WebToolsServerHandler {
    /// Build every tool enabled in `config`; any invalid tool config is fatal
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing web tools MCP server handler");

        let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
        if let Some(tavily) = &config.tavily {
            tools.push(Arc::new(TavilySearchTool::new(tavily.clone())?));
        }
        if let Some(delete) = config.enabled_delete() {
            tools.push(Arc::new(DeleteTool::new(delete.clone())?));
        }

        Ok(Self::from_tools(tools))
    }

    #[must_use]
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }

    #[must_use]
    pub fn tool_infos(&self) -> Vec<ToolInfo> {
        self.tools.iter().map(|tool| tool.info()).collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.info().name == name)
    }

    /// Run one tool call.
    ///
    /// Unknown tools and malformed arguments are protocol errors; a failing
    /// tool is reported as an error result so the agent can see the message.
    #[instrument(skip(self, arguments, cancellation))]
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        cancellation: &CancellationToken,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let tool = self
            .find(name)
            .ok_or_else(|| ErrorData::invalid_request(format!("Unknown tool: {name}"), None))?;

        let arguments = serde_json::to_string(&arguments.unwrap_or_default())
            .map_err(|e| ErrorData::internal_error(format!("Serialization failed: {e}"), None))?;

        match tool.invoke(&arguments, cancellation).await {
            Ok(output) => {
                debug!("Tool {} succeeded", name);
                Ok(CallToolResult::success(vec![Content::text(output)]))
            }
            Err(e @ Error::InvalidInput { .. }) => {
                Err(ErrorData::invalid_params(e.to_string(), None))
            }
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

fn to_mcp_tool(info: ToolInfo) -> rmcp::model::Tool {
    rmcp::model::Tool::new(info.name, info.description, Arc::new(info.parameters))
}

impl ServerHandler for WebToolsServerHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::default()
            },
            ..ServerInfo::default()
        }
    }

    #[instrument(skip(self, _request, _context))]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ListToolsResult, ErrorData>> + Send + '_ {
        info!("Listing available tools");
        let tools = self.tool_infos().into_iter().map(to_mcp_tool).collect();
        std::future::ready(Ok(ListToolsResult {
            tools,
            next_cursor: None,
        }))
    }

    #[instrument(skip(self, request, context))]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<CallToolResult, ErrorData>> + Send + '_ {
        info!("Tool called: {}", request.name);
        async move {
            self.dispatch(&request.name, request.arguments, &context.ct)
                .await
        }
    }
}
