//! Agent-callable tools.
//!
//! Every tool exposes a [`ToolInfo`] (name, description and a JSON schema of its
//! arguments generated from the typed request) and can be invoked with a JSON
//! argument string, mirroring how an agent framework calls it.

pub mod delete;
pub mod search;

pub use delete::{DeleteConfig, DeleteRequest, DeleteTool};
pub use search::{
    ImageResult, SearchRequest, SearchResponse, SearchResult, TavilySearchConfig,
    TavilySearchRequest, TavilySearchTool,
};

use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Discovery information for a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    /// JSON schema object describing the accepted arguments
    pub parameters: Map<String, Value>,
}

/// Unified trait implemented by every tool
#[async_trait]
pub trait Tool: Send + Sync + fmt::Debug {
    /// Name, description and parameter schema
    fn info(&self) -> ToolInfo;

    /// Run the tool with JSON-encoded arguments and return its textual output
    async fn invoke(&self, arguments: &str, cancellation: &CancellationToken) -> Result<String>;
}

/// Generate the parameter schema of a request type.
///
/// Field doc comments become property descriptions; fields without
/// `#[serde(default)]` are listed under `required`.
#[must_use]
pub fn parameters_schema<T: JsonSchema>() -> Map<String, Value> {
    let schema = schemars::schema_for!(T);
    let mut parameters = match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    parameters.remove("$schema");
    parameters.remove("title");
    parameters
}

pub(crate) fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: &str) -> Result<T> {
    serde_json::from_str(arguments).map_err(|e| Error::InvalidInput {
        field: "arguments".to_string(),
        reason: format!("{tool}: {e}"),
    })
}

/// Treat an explicit JSON `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
