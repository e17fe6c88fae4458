use std::net::SocketAddr;

use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ServiceExt as _, transport::stdio};
use tracing::{error, info};

use crate::errors::ServerError;
use crate::server::Transport;

use super::{Running, shutdown_signal};

pub(super) struct Starting {
    pub(super) transport: Transport,
    pub(super) running: Running,
}

impl Starting {
    /// Start serving. Over HTTP this returns once the listener is bound; over stdio it returns
    /// when the client goes away. Either way the token of the returned state is cancelled once
    /// serving has stopped.
    pub(super) async fn start(self) -> Result<Running, ServerError> {
        let running = self.running;
        info!(
            tools = running.registry.len(),
            "Registered GitHub Stars tools"
        );

        match self.transport {
            Transport::StreamableHttp {
                address,
                port,
                stateful_mode,
            } => {
                info!(port = ?port, address = ?address, "Starting MCP server in Streamable HTTP mode");
                let handler = running.clone();
                let service = StreamableHttpService::new(
                    move || Ok(handler.clone()),
                    LocalSessionManager::default().into(),
                    StreamableHttpServerConfig {
                        stateful_mode,
                        ..Default::default()
                    },
                );
                let router = axum::Router::new().nest_service("/mcp", service);

                let tcp_listener =
                    tokio::net::TcpListener::bind(SocketAddr::new(address, port)).await?;
                let token = running.cancellation_token.clone();
                tokio::spawn(async move {
                    let stop = token.clone();
                    if let Err(e) = axum::serve(tcp_listener, router)
                        .with_graceful_shutdown(async move {
                            tokio::select! {
                                _ = shutdown_signal() => {},
                                _ = stop.cancelled() => {},
                            }
                        })
                        .await
                    {
                        error!("Failed to serve MCP over HTTP: {e:?}");
                    }
                    info!("MCP server stopped");
                    token.cancel();
                });
            }
            Transport::Stdio => {
                info!("Starting MCP server in stdio mode");
                let service = running
                    .clone()
                    .serve(stdio())
                    .await
                    .inspect_err(|e| {
                        error!("serving error: {:?}", e);
                    })
                    .map_err(Box::new)?;
                service.waiting().await.map_err(ServerError::StartupError)?;
                running.cancellation_token.cancel();
            }
        }

        Ok(running)
    }
}
