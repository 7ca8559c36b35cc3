pub mod executor;
pub mod transport;

pub use executor::HttpExecutor;
pub use transport::{BodyStream, HttpTransport, ReqwestTransport, TransportResponse};

use std::time::Duration;

/// HTTP client configuration shared by the tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Total request timeout, including reading the body. `None` never times out.
    pub timeout: Option<Duration>,
    /// Connection timeout duration
    pub connect_timeout: Option<Duration>,
    /// Proxy URL (optional)
    pub proxy: Option<String>,
}

impl HttpClientConfig {
    /// Client configuration with only a total timeout set
    #[must_use]
    pub const fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            connect_timeout: None,
            proxy: None,
        }
    }
}
