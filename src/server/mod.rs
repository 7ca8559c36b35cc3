pub mod handler;
pub mod transport;

use crate::{Config, Error, Result};
use rmcp::{service::ServiceExt, transport::stdio};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use handler::WebToolsServerHandler;

/// MCP server exposing the configured web tools over stdio
pub struct Server {
    config: Arc<Config>,
    cancellation_token: CancellationToken,
}

impl Server {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub async fn run(&self) -> Result<()> {
        info!("Starting MCP server");

        let handler = WebToolsServerHandler::new(&self.config)?;
        for tool in handler.tool_infos() {
            info!("Registered tool: {}", tool.name);
        }

        transport::validate_stdio_transport()
            .map_err(|e| Error::Service(format!("Transport validation failed: {e}")))?;

        self.spawn_signal_listener();

        let result = self.run_mcp_server(handler).await;
        info!("MCP server shutdown complete");
        result
    }

    fn spawn_signal_listener(&self) {
        let shutdown_token = self.cancellation_token.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                let (mut sigterm, mut sigint) = match (
                    signal::unix::signal(signal::unix::SignalKind::terminate()),
                    signal::unix::signal(signal::unix::SignalKind::interrupt()),
                ) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        error!("Failed to install signal handlers: {}", e);
                        return;
                    }
                };

                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
                    _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
                }
            }

            #[cfg(not(unix))]
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }

            shutdown_token.cancel();
        });
    }

    async fn run_mcp_server(&self, handler: WebToolsServerHandler) -> Result<()> {
        info!("Connecting MCP server to stdio transport");

        let service_token = self.cancellation_token.child_token();
        let server = tokio::select! {
            result = handler.serve_with_ct(stdio(), service_token) => result
                .map_err(|e| Error::Service(format!("Failed to start MCP server: {e}")))?,
            () = self.cancellation_token.cancelled() => {
                info!("Shutdown requested before a client connected");
                return Ok(());
            }
        };

        let grace = Duration::from_secs(self.config.server.graceful_shutdown_timeout_secs);
        match drain_on_shutdown(server.waiting(), &self.cancellation_token, grace).await {
            Some(Ok(quit_reason)) => {
                info!("MCP server completed with reason: {:?}", quit_reason);
                Ok(())
            }
            Some(Err(e)) => Err(Error::Service(format!("MCP server error: {e}"))),
            None => {
                warn!("Graceful shutdown timeout exceeded, forcing shutdown");
                Ok(())
            }
        }
    }

    pub fn shutdown(&self) {
        warn!("Initiating server shutdown");
        self.cancellation_token.cancel();
    }

    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Await `service`; once `shutdown` fires, allow it `grace` to wind down.
///
/// Returns `None` when the grace period runs out first.
async fn drain_on_shutdown<F: Future>(
    service: F,
    shutdown: &CancellationToken,
    grace: Duration,
) -> Option<F::Output> {
    tokio::pin!(service);

    tokio::select! {
        output = &mut service => return Some(output),
        () = shutdown.cancelled() => info!("Shutdown requested, waiting for in-flight calls"),
    }

    tokio::time::timeout(grace, service).await.ok()
}
