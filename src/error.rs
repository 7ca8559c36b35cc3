use std::time::Duration;
use thiserror::Error;

/// Boxed cause carried by transport-level errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error categorization for a single tool call
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (fatal to tool creation)
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // Caller errors
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Failed to marshal request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to create request: {0}")]
    RequestBuild(#[source] BoxError),

    // Network errors
    #[error("Failed to execute request: {0}")]
    Transport(#[source] BoxError),

    /// `timeout` is `None` when the limit was set on a caller-supplied client
    #[error("Timeout error: operation timed out{}", after(.timeout))]
    Timeout { timeout: Option<Duration> },

    #[error("Request cancelled by caller")]
    Cancelled,

    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] BoxError),

    #[error("Failed to unmarshal response: {0}")]
    Decode(#[source] serde_json::Error),

    // General service error
    #[error("Service error: {0}")]
    Service(String),
}

/// Error categorization for caller-side retry strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Permanent errors - should not retry
    Permanent,
    /// Transient errors - safe to retry
    Transient,
}

impl Error {
    /// Categorize error for retry logic
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::Timeout { .. } | Self::ReadBody(_) => {
                ErrorCategory::Transient
            }
            Self::Config(_)
            | Self::InvalidConfig { .. }
            | Self::InvalidInput { .. }
            | Self::Encode(_)
            | Self::RequestBuild(_)
            | Self::Cancelled
            | Self::Decode(_)
            | Self::Service(_) => ErrorCategory::Permanent,
        }
    }

    /// Check if error is retryable.
    ///
    /// Tools never retry on their own; this only informs the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transient)
    }

    pub(crate) fn missing_field(field: &str, reason: &str) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn after(timeout: &Option<Duration>) -> String {
    timeout.map_or_else(String::new, |timeout| format!(" after {timeout:?}"))
}

pub type Result<T> = std::result::Result<T, Error>;
