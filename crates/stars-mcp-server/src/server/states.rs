use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::errors::ServerError;

use super::Server;

mod running;
mod starting;

use running::Running;
use starting::Starting;

pub(super) struct StateMachine {}

impl StateMachine {
    pub(crate) async fn start(self, server: Server) -> Result<(), ServerError> {
        let starting = Starting {
            transport: server.transport,
            running: Running {
                adapter: server.adapter,
                registry: Arc::new(server.registry),
                server_info: server.server_info,
                cancellation_token: CancellationToken::new(),
            },
        };

        let running = starting.start().await?;
        running.cancellation_token.cancelled().await;
        Ok(())
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
