use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use web_tools_mcp::{
    Config, ConfigOverrides, DeleteRequest, DeleteTool, LogFormat, SearchRequest, Server,
    TavilySearchTool, WebToolsServerHandler,
};

#[derive(Parser, Debug)]
#[command(name = "web-tools-mcp", version)]
#[command(
    about = "Tavily web search and HTTP DELETE tools for LLM agents (MCP stdio server)",
    long_about = None
)]
struct Cli {
    /// Configuration file (default: platform config dir/web-tools-mcp/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `web_tools_mcp=trace`; wins over `RUST_LOG`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Tavily API key; enables the search tool
    #[arg(long, global = true, env = "TAVILY_API_KEY", hide_env_values = true)]
    tavily_api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as an MCP stdio server (default)
    Serve,
    /// Run one Tavily search and print the JSON response
    Search {
        query: String,
        /// Search category: general or news
        #[arg(long)]
        topic: Option<String>,
    },
    /// Send one DELETE request and print the response body
    Delete { url: String },
    /// Print name, description and parameter schema of every enabled tool
    Schema,
    /// Print the effective configuration with secrets masked
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_log_level = cli.log_level.clone();

    let mut config =
        Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply_overrides(ConfigOverrides {
        log_level: cli.log_level,
        log_format: cli.log_format,
        tavily_api_key: cli.tavily_api_key,
    });
    config.validate()?;

    init_tracing(&config, cli_log_level.as_deref())?;
    tracing::debug!("Effective configuration: {:?}", config.redacted());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => Server::new(config).run().await?,
        Commands::Search { query, topic } => {
            let tavily = config.tavily.context(
                "search requires a Tavily API key (--tavily-api-key or [tavily] api_key)",
            )?;
            let tool = TavilySearchTool::new(tavily)?;
            let request = SearchRequest {
                query,
                topic: topic.unwrap_or_default(),
            };
            let response =
                with_ctrl_c(|token| async move { tool.search(request, &token).await }).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Delete { url } => {
            let delete = config
                .enabled_delete()
                .context("the DELETE tool is disabled ([delete] enabled = false)")?;
            let tool = DeleteTool::new(delete.clone())?;
            let request = DeleteRequest { url };
            let body =
                with_ctrl_c(|token| async move { tool.delete(request, &token).await }).await?;
            println!("{body}");
        }
        Commands::Schema => {
            let handler = WebToolsServerHandler::new(&config)?;
            println!("{}", serde_json::to_string_pretty(&handler.tool_infos())?);
        }
        Commands::ShowConfig => {
            print!("{}", toml::to_string(&config.redacted())?);
        }
    }

    Ok(())
}

/// Pick the filter directive: `--log-level`, then `RUST_LOG`, then the config file
fn filter_directive(
    cli_level: Option<&str>,
    env_level: Option<String>,
    config_level: &str,
) -> String {
    cli_level
        .map(str::to_string)
        .or_else(|| env_level.filter(|level| !level.trim().is_empty()))
        .unwrap_or_else(|| config_level.to_string())
}

/// Logs go to stderr; stdout carries the MCP stream
fn init_tracing(config: &Config, cli_level: Option<&str>) -> Result<()> {
    let directive = filter_directive(
        cli_level,
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        &config.logging.level,
    );
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log level: {directive}"))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

/// Run a one-shot call that Ctrl-C cancels
async fn with_ctrl_c<F, Fut, T>(call: F) -> web_tools_mcp::Result<T>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: std::future::Future<Output = web_tools_mcp::Result<T>>,
{
    let token = CancellationToken::new();
    let watcher = token.clone();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, cancelling request");
            watcher.cancel();
        }
    });

    let result = call(token).await;
    listener.abort();
    result
}
