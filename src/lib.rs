//! Web tools for LLM agents: a Tavily web search tool and an HTTP DELETE tool,
//! usable as a library or served over MCP stdio.

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod tools;

pub use client::{
    HttpClientConfig, HttpExecutor, HttpTransport, ReqwestTransport, TransportResponse,
};
pub use config::{Config, ConfigOverrides, LogFormat};
pub use error::{Error, ErrorCategory, Result};
pub use server::{Server, WebToolsServerHandler};
pub use tools::{
    DeleteConfig, DeleteRequest, DeleteTool, SearchRequest, SearchResponse, TavilySearchConfig,
    TavilySearchRequest, TavilySearchTool, Tool, ToolInfo,
};
