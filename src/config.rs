//! Layered application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! `WEB_TOOLS__*` environment variables, then command-line overrides.

use crate::tools::{DeleteConfig, TavilySearchConfig};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable prefix, e.g. `WEB_TOOLS__TAVILY__API_KEY`
pub const ENV_PREFIX: &str = "WEB_TOOLS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Tavily search tool; disabled when the section is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tavily: Option<TavilySearchConfig>,
    /// DELETE tool; on by default, turned off with `[delete] enabled = false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<DeleteConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            tavily: None,
            delete: Some(DeleteConfig::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub graceful_shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            graceful_shutdown_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `web_tools_mcp=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Values given on the command line; they win over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub tavily_api_key: Option<String>,
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist; without one the default location is
    /// read only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                if let Some(default_path) = Self::default_path() {
                    debug!("Looking for configuration at {}", default_path.display());
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/web-tools-mcp/config.toml` or the platform equivalent
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("web-tools-mcp").join("config.toml"))
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if let Some(api_key) = overrides.tavily_api_key {
            self.tavily.get_or_insert_with(TavilySearchConfig::default).api_key = api_key;
        }
    }

    /// Checks that do not depend on a tool being built
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(Error::InvalidConfig {
                field: "logging.level".to_string(),
                reason: "log level cannot be empty".to_string(),
            });
        }

        if self.tavily.is_none() && self.enabled_delete().is_none() {
            return Err(Error::InvalidConfig {
                field: "tools".to_string(),
                reason: "at least one of [tavily] or [delete] must be configured".to_string(),
            });
        }

        Ok(())
    }

    /// The DELETE tool section, unless absent or disabled
    #[must_use]
    pub fn enabled_delete(&self) -> Option<&DeleteConfig> {
        self.delete.as_ref().filter(|delete| delete.enabled)
    }

    /// Copy safe to print: secrets and auth headers are masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(tavily) = copy.tavily.as_mut() {
            if !tavily.api_key.is_empty() {
                tavily.api_key = "<redacted>".to_string();
            }
            redact_auth(&mut tavily.headers);
        }
        if let Some(delete) = copy.delete.as_mut() {
            redact_auth(&mut delete.headers);
        }
        copy
    }
}

fn redact_auth(headers: &mut std::collections::HashMap<String, String>) {
    for (name, value) in headers.iter_mut() {
        if name.eq_ignore_ascii_case("authorization") {
            *value = "<redacted>".to_string();
        }
    }
}

/// Serde adapter storing `Option<Duration>` as whole seconds
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
