use super::{null_as_default, parameters_schema, parse_arguments, Tool, ToolInfo};
use crate::client::{HttpClientConfig, HttpExecutor, HttpTransport, ReqwestTransport};
use crate::config::duration_secs;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Tavily search endpoint
pub const SEARCH_API_URL: &str = "https://api.tavily.com/search";

pub const DEFAULT_TOOL_NAME: &str = "tavily_search";
pub const DEFAULT_TOOL_DESC: &str = "search web for information by tavily";

/// Topics a caller may request; anything else falls back to the upstream default
pub const ACCEPTED_TOPICS: [&str; 2] = ["general", "news"];

/// Configuration of the Tavily search tool.
///
/// Every search parameter is optional: `None` means "let the API decide",
/// which is distinct from an explicit zero or `false`. Values are passed to
/// the API as-is, without local range checks.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TavilySearchConfig {
    /// Tool name advertised to callers (default: `tavily_search`)
    pub tool_name: String,
    /// Tool description advertised to callers
    pub tool_desc: String,

    /// Tavily API key (required)
    pub api_key: String,

    /// Endpoint override (default: [`SEARCH_API_URL`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Let Tavily pick search parameters from the query intent. Explicit values
    /// still win. May upgrade `search_depth` to advanced, which costs 2 credits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_parameters: Option<bool>,

    /// Search category: `general` or `news`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// `basic` (1 credit) or `advanced` (2 credits)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_depth: Option<String>,

    /// Content chunks per source, 1..=3. Only used with advanced depth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_per_source: Option<i32>,

    /// Maximum number of results, 1..=20 (API default 5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i32>,

    /// `day`, `week`, `month`, `year` or `d`, `w`, `m`, `y`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,

    /// Days back to include; news topic only (API default 7)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_answer: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_raw_content: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,

    /// Only meaningful together with `include_images`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_image_descriptions: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,

    /// Boost results from a country (lowercase English name); general topic only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Extra HTTP headers sent with every request
    pub headers: HashMap<String, String>,

    /// Per-request timeout in seconds; unset never times out
    #[serde(
        rename = "timeout_secs",
        with = "duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl fmt::Debug for TavilySearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&String> = self.headers.keys().collect();
        f.debug_struct("TavilySearchConfig")
            .field("tool_name", &self.tool_name)
            .field("tool_desc", &self.tool_desc)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("auto_parameters", &self.auto_parameters)
            .field("topic", &self.topic)
            .field("search_depth", &self.search_depth)
            .field("chunks_per_source", &self.chunks_per_source)
            .field("max_results", &self.max_results)
            .field("time_range", &self.time_range)
            .field("days", &self.days)
            .field("include_answer", &self.include_answer)
            .field("include_raw_content", &self.include_raw_content)
            .field("include_images", &self.include_images)
            .field("include_image_descriptions", &self.include_image_descriptions)
            .field("include_domains", &self.include_domains)
            .field("exclude_domains", &self.exclude_domains)
            .field("country", &self.country)
            .field("headers", &header_names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TavilySearchConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = Some(depth.into());
        self
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: i32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    #[must_use]
    pub const fn with_include_answer(mut self, include_answer: bool) -> Self {
        self.include_answer = Some(include_answer);
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fill defaults, check the API key and inject the auth headers.
    ///
    /// Running it again on a validated config changes nothing. Any
    /// caller-supplied `Authorization` or `Content-Type` header is replaced.
    pub fn validate(&mut self) -> Result<()> {
        if self.tool_name.is_empty() {
            self.tool_name = DEFAULT_TOOL_NAME.to_string();
        }

        if self.tool_desc.is_empty() {
            self.tool_desc = DEFAULT_TOOL_DESC.to_string();
        }

        if self.api_key.is_empty() {
            return Err(Error::missing_field(
                "api_key",
                "tavily search tool config is missing API key",
            ));
        }

        self.headers.retain(|name, _| {
            !name.eq_ignore_ascii_case("authorization")
                && !name.eq_ignore_ascii_case("content-type")
        });
        self.headers
            .insert("Authorization".to_string(), format!("Bearer {}", self.api_key));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());

        Ok(())
    }

    /// Endpoint the search request is posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.base_url.as_deref().unwrap_or(SEARCH_API_URL)
    }
}

/// Arguments accepted by the Tavily search tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// The search query to execute with Tavily.
    pub query: String,
    /// The category of the search. general or news.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub topic: String,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            topic: String::new(),
        }
    }
}

/// Body of the POST sent to Tavily; unset fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TavilySearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_parameters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_depth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_per_source: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_answer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_raw_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_image_descriptions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl TavilySearchRequest {
    /// Layer the configured parameters over a caller request.
    ///
    /// The query always comes from the request. The request topic is kept only
    /// if it is one of [`ACCEPTED_TOPICS`] and the config sets no topic; every
    /// other field comes from the config.
    #[must_use]
    pub fn merge(request: &SearchRequest, config: &TavilySearchConfig) -> Self {
        let requested_topic = ACCEPTED_TOPICS
            .contains(&request.topic.as_str())
            .then(|| request.topic.clone());

        Self {
            query: request.query.clone(),
            auto_parameters: config.auto_parameters,
            topic: config.topic.clone().or(requested_topic),
            search_depth: config.search_depth.clone(),
            chunks_per_source: config.chunks_per_source,
            max_results: config.max_results,
            time_range: config.time_range.clone(),
            days: config.days,
            include_answer: config.include_answer,
            include_raw_content: config.include_raw_content,
            include_images: config.include_images,
            include_image_descriptions: config.include_image_descriptions,
            include_domains: config.include_domains.clone(),
            exclude_domains: config.exclude_domains.clone(),
            country: config.country.clone(),
        }
    }
}

/// Individual search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the search result.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// The URL of the search result.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// A short description of the search result.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// The relevance score of the search result.
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    /// Cleaned page content; empty unless raw content was requested.
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_content: String,
}

/// Query-related image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawImage")]
pub struct ImageResult {
    pub url: String,
    /// Empty unless image descriptions were requested
    pub description: String,
}

/// Tavily sends bare URLs unless image descriptions are enabled
#[derive(Deserialize)]
#[serde(untagged)]
enum RawImage {
    Url(String),
    Described {
        #[serde(default, deserialize_with = "null_as_default")]
        url: String,
        #[serde(default, deserialize_with = "null_as_default")]
        description: String,
    },
}

impl From<RawImage> for ImageResult {
    fn from(raw: RawImage) -> Self {
        match raw {
            RawImage::Url(url) => Self {
                url,
                description: String::new(),
            },
            RawImage::Described { url, description } => Self { url, description },
        }
    }
}

/// Decoded Tavily reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The search query that was executed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    /// LLM-generated answer; empty unless an answer was requested.
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    /// Results sorted by relevance, in the order received.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchResult>,
    /// Query-related images.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<ImageResult>,
}

/// Tavily web search tool
#[derive(Debug, Clone)]
pub struct TavilySearchTool {
    config: Arc<TavilySearchConfig>,
    executor: HttpExecutor,
}

impl TavilySearchTool {
    /// Validate `config` and create the tool with its own HTTP client
    pub fn new(config: TavilySearchConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&HttpClientConfig::with_timeout(config.timeout))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Validate `config` and create the tool on top of an existing transport
    pub fn with_transport(
        mut config: TavilySearchConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "Initializing {} tool against {}",
            config.tool_name,
            config.endpoint()
        );

        let executor = HttpExecutor::new(transport, config.timeout);
        Ok(Self {
            config: Arc::new(config),
            executor,
        })
    }

    /// The validated, frozen configuration
    #[must_use]
    pub fn config(&self) -> &TavilySearchConfig {
        &self.config
    }

    /// Search the web for information
    #[instrument(skip(self, cancellation), fields(tool = %self.config.tool_name))]
    pub async fn search(
        &self,
        request: SearchRequest,
        cancellation: &CancellationToken,
    ) -> Result<SearchResponse> {
        let wire_request = TavilySearchRequest::merge(&request, &self.config);
        let body = serde_json::to_vec(&wire_request).map_err(Error::Encode)?;

        let http_request = HttpExecutor::build_request(
            Method::POST,
            self.config.endpoint(),
            &self.config.headers,
            Some(body),
        )?;
        let bytes = self.executor.execute(http_request, cancellation).await?;

        let response: SearchResponse = serde_json::from_slice(&bytes).map_err(Error::Decode)?;
        debug!(
            "Tavily returned {} results and {} images",
            response.results.len(),
            response.images.len()
        );
        Ok(response)
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.config.tool_name.clone(),
            description: self.config.tool_desc.clone(),
            parameters: parameters_schema::<SearchRequest>(),
        }
    }

    async fn invoke(&self, arguments: &str, cancellation: &CancellationToken) -> Result<String> {
        let request: SearchRequest = parse_arguments(&self.config.tool_name, arguments)?;
        let response = self.search(request, cancellation).await?;
        serde_json::to_string(&response).map_err(Error::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BodyStream, TransportResponse};
    use crate::error::BoxError;
    use bytes::Bytes;
    use futures::{stream, StreamExt};
    use reqwest::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    const MOCK_REPLY: &str = r#"{
        "query": "what is transformer",
        "follow_up_questions": null,
        "answer": null,
        "images": [],
        "results": [
            {
                "title": "Transformer: What is it?",
                "url": "https://www.electrical4u.com/what-is-transformer/",
                "content": "A transformer is a passive electrical device.",
                "score": 0.9006087,
                "raw_content": null
            },
            {
                "title": "Transformer | Britannica",
                "url": "https://www.britannica.com/technology/transformer-electronics",
                "content": "Device that transfers electric energy.",
                "score": 0.8440111,
                "raw_content": null
            },
            {
                "title": "How do electricity transformers work?",
                "url": "https://www.explainthatstuff.com/transformers.html",
                "content": "A transformer is based on a very simple fact.",
                "score": 0.6364215,
                "raw_content": null
            },
            {
                "title": "Transformer - Wikipedia",
                "url": "https://en.wikipedia.org/wiki/Transformer",
                "content": "[Jump to content]",
                "score": 0.57637566,
                "raw_content": null
            },
            {
                "title": "What is a Transformer?",
                "url": "https://www.electricaltechnology.org/transformer.html",
                "content": "Learn what is an electrical transformer.",
                "score": 0.47928494,
                "raw_content": null
            }
        ],
        "response_time": 1.58
    }"#;

    /// Transport that records the request and replies with a fixed body
    #[derive(Debug)]
    struct RecordingTransport {
        reply: &'static str,
        seen: Mutex<Vec<(Method, String, HashMap<String, String>, Value)>>,
    }

    impl RecordingTransport {
        fn new(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn execute(
            &self,
            request: Request,
        ) -> std::result::Result<TransportResponse, BoxError> {
            let headers = request
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            let body = request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(serde_json::from_slice::<Value>)
                .transpose()?
                .unwrap_or(Value::Null);
            self.seen.lock().unwrap().push((
                request.method().clone(),
                request.url().to_string(),
                headers,
                body,
            ));

            let body: BodyStream =
                stream::iter(vec![Ok(Bytes::from_static(self.reply.as_bytes()))]).boxed();
            Ok(TransportResponse {
                status: StatusCode::OK,
                body,
            })
        }
    }

    #[test]
    fn test_validate_fills_defaults_and_headers() {
        let mut config = TavilySearchConfig::new("{mock_api_key}");
        config.validate().unwrap();

        assert_eq!(config.tool_name, DEFAULT_TOOL_NAME);
        assert_eq!(config.tool_desc, DEFAULT_TOOL_DESC);
        assert_eq!(config.headers["Authorization"], "Bearer {mock_api_key}");
        assert_eq!(config.headers["Content-Type"], "application/json");

        // Second pass changes nothing
        let snapshot = config.clone();
        config.validate().unwrap();
        assert_eq!(config, snapshot);
    }

    #[test]
    fn test_validate_keeps_custom_identity() {
        let mut config = TavilySearchConfig {
            tool_name: "web_search".to_string(),
            tool_desc: "custom".to_string(),
            ..TavilySearchConfig::new("key")
        }
        .with_header("authorization", "Bearer stale")
        .with_header("User-Agent", "agent/1.0");
        config.validate().unwrap();

        assert_eq!(config.tool_name, "web_search");
        assert_eq!(config.tool_desc, "custom");
        assert!(!config.headers.contains_key("authorization"));
        assert_eq!(config.headers["Authorization"], "Bearer key");
        assert_eq!(config.headers["User-Agent"], "agent/1.0");
    }

    #[test]
    fn test_validate_requires_api_key() {
        let mut config = TavilySearchConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref field, .. } if field == "api_key"));
        assert!(err.to_string().contains("missing API key"));
    }

    #[test]
    fn test_missing_api_key_never_reaches_transport() {
        let transport = RecordingTransport::new(MOCK_REPLY);
        let result =
            TavilySearchTool::with_transport(TavilySearchConfig::default(), transport.clone());
        assert!(result.is_err());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut config = TavilySearchConfig::new("tvly-secret");
        config.validate().unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("tvly-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_merge_with_bare_config() {
        let config = TavilySearchConfig::new("key");
        let request = SearchRequest::new("What is transformer?");
        let merged = TavilySearchRequest::merge(&request, &config);

        assert_eq!(
            merged,
            TavilySearchRequest {
                query: "What is transformer?".to_string(),
                ..TavilySearchRequest::default()
            }
        );
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({"query": "What is transformer?"})
        );
    }

    #[test]
    fn test_merge_topic_rules() {
        let config = TavilySearchConfig::new("key");
        let news = SearchRequest {
            query: "q".to_string(),
            topic: "news".to_string(),
        };
        assert_eq!(
            TavilySearchRequest::merge(&news, &config).topic.as_deref(),
            Some("news")
        );

        let finance = SearchRequest {
            query: "q".to_string(),
            topic: "finance".to_string(),
        };
        assert_eq!(TavilySearchRequest::merge(&finance, &config).topic, None);

        let config = config.with_topic("general");
        assert_eq!(
            TavilySearchRequest::merge(&news, &config).topic.as_deref(),
            Some("general")
        );
    }

    #[test]
    fn test_merge_passes_config_values_through() {
        let config = TavilySearchConfig {
            auto_parameters: Some(false),
            chunks_per_source: Some(9),
            max_results: Some(0),
            include_images: Some(false),
            include_domains: Some(vec!["example.com".to_string()]),
            country: Some("atlantis".to_string()),
            ..TavilySearchConfig::new("key")
        };
        let merged = TavilySearchRequest::merge(&SearchRequest::new("q"), &config);

        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({
                "query": "q",
                "auto_parameters": false,
                "chunks_per_source": 9,
                "max_results": 0,
                "include_images": false,
                "include_domains": ["example.com"],
                "country": "atlantis"
            })
        );
    }

    #[test]
    fn test_decode_normalizes_nulls() {
        let response: SearchResponse = serde_json::from_str(MOCK_REPLY).unwrap();
        assert_eq!(response.query, "what is transformer");
        assert_eq!(response.answer, "");
        assert_eq!(response.results.len(), 5);
        assert!(response.results.iter().all(|r| r.raw_content.is_empty()));
        assert!(response.images.is_empty());

        let sparse: SearchResponse =
            serde_json::from_str(r#"{"query": "q", "results": null}"#).unwrap();
        assert!(sparse.results.is_empty());
        assert!(sparse.images.is_empty());
    }

    #[test]
    fn test_decode_both_image_shapes() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"query": "q", "images": [
                "https://img.example/a.png",
                {"url": "https://img.example/b.png", "description": "a cat"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            response.images,
            vec![
                ImageResult {
                    url: "https://img.example/a.png".to_string(),
                    description: String::new(),
                },
                ImageResult {
                    url: "https://img.example/b.png".to_string(),
                    description: "a cat".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_tool_info_schema() {
        let tool = TavilySearchTool::with_transport(
            TavilySearchConfig::new("key"),
            RecordingTransport::new(MOCK_REPLY),
        )
        .unwrap();
        let info = tool.info();

        assert_eq!(info.name, "tavily_search");
        assert_eq!(info.description, DEFAULT_TOOL_DESC);
        assert_eq!(info.parameters["type"], "object");
        assert_eq!(
            info.parameters["properties"]["query"]["description"],
            "The search query to execute with Tavily."
        );
        assert_eq!(
            info.parameters["properties"]["topic"]["description"],
            "The category of the search. general or news."
        );
        assert_eq!(info.parameters["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_search_posts_merged_request() {
        let transport = RecordingTransport::new(MOCK_REPLY);
        let config = TavilySearchConfig::new("{mock_api_key}").with_country("china");
        let tool = TavilySearchTool::with_transport(config, transport.clone()).unwrap();

        let response = tool
            .search(SearchRequest::new("What is transformer?"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.results.len(), 5);
        assert_eq!(response.results[0].score, 0.9006087);
        assert_eq!(response.results[4].title, "What is a Transformer?");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (method, url, headers, body) = &seen[0];
        assert_eq!(method, Method::POST);
        assert_eq!(url, SEARCH_API_URL);
        assert_eq!(headers["authorization"], "Bearer {mock_api_key}");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(body, &json!({"query": "What is transformer?", "country": "china"}));
    }

    #[tokio::test]
    async fn test_invoke_returns_normalized_json() {
        let tool = TavilySearchTool::with_transport(
            TavilySearchConfig::new("key"),
            RecordingTransport::new(MOCK_REPLY),
        )
        .unwrap();

        let output = tool
            .invoke(r#"{"query":"What is transformer?"}"#, &CancellationToken::new())
            .await
            .unwrap();

        assert!(output.starts_with(r#"{"query":"what is transformer","answer":"","results":[{"#));
        assert!(output.contains(r#"[{"title":"Transformer: What is it?","#));
        assert!(output.ends_with(r#""raw_content":""}],"images":[]}"#));
    }

    #[tokio::test]
    async fn test_invoke_rejects_malformed_arguments() {
        let transport = RecordingTransport::new(MOCK_REPLY);
        let tool =
            TavilySearchTool::with_transport(TavilySearchConfig::new("key"), transport.clone())
                .unwrap();

        let err = tool
            .invoke(r#"{"topic":"news"}"#, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_treats_null_topic_as_absent() {
        let transport = RecordingTransport::new(MOCK_REPLY);
        let tool =
            TavilySearchTool::with_transport(TavilySearchConfig::new("key"), transport.clone())
                .unwrap();

        let output = tool
            .invoke(r#"{"query":"q","topic":null}"#, &CancellationToken::new())
            .await
            .unwrap();
        assert!(output.contains("what is transformer"));

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].3, json!({"query": "q"}));
    }

    #[tokio::test]
    async fn test_non_json_reply_is_decode_error() {
        let tool = TavilySearchTool::with_transport(
            TavilySearchConfig::new("key"),
            RecordingTransport::new("<html>502 Bad Gateway</html>"),
        )
        .unwrap();

        let err = tool
            .search(SearchRequest::new("q"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
