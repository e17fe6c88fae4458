use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use runtime::logging::{Logging, LoggingLayerBuilder};
use stars_api::{ApiError, StarsAdapter, TracingObserver};
use stars_mcp_server::server::Server;
use tracing::{error, info, warn};
use tracing_subscriber::Layer as _;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = STYLES,
    about = "GitHub Stars MCP Server - manage Stars contributions, links and profile from an AI agent",
)]
struct Args {
    /// Path to the config file. Without it, configuration comes from the environment only.
    #[arg(long, short = 'c', env = "STARS_MCP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match args.config {
        Some(path) => runtime::read_config(path)?,
        None => runtime::read_config_from_env()?,
    };

    // On stdio, stdout carries MCP messages so console logs go to stderr
    let (logging_layer, _guard) = LoggingLayerBuilder::new()
        .with_stderr_console(config.transport.uses_stdio())
        .build(&config.logging)?;
    tracing_subscriber::registry()
        .with(logging_layer.with_filter(Logging::env_filter(&config.logging)?))
        .init();

    info!(
        "GitHub Stars MCP Server v{} // Licensed under MIT",
        std::env!("CARGO_PKG_VERSION")
    );

    config.check_credentials()?;
    if config.dangerously_omit_auth && config.stars_api.token.is_none() {
        warn!("Starting without an API token: only public profile reads will succeed");
    }

    let adapter = StarsAdapter::from_config(
        &config.stars_api,
        config.url_validation.clone(),
        Arc::new(TracingObserver),
    )?;

    if config.startup.verify_token && config.stars_api.token.is_some() {
        verify_token(&adapter, config.startup.verify_timeout).await?;
    }

    Ok(Server::builder()
        .transport(config.transport)
        .adapter(Arc::new(adapter))
        .server_info(config.server_info)
        .build()
        .start()
        .await?)
}

/// A token the API rejects stops startup. A slow API only earns a warning.
async fn verify_token(adapter: &StarsAdapter, timeout: Duration) -> Result<(), ApiError> {
    match adapter.verify_credentials(timeout).await {
        Ok(()) => {
            info!("API token verified");
            Ok(())
        }
        Err(ApiError::Timeout(reason)) => {
            warn!(%reason, "Could not verify the API token in time, continuing");
            Ok(())
        }
        Err(e) => {
            error!("API token was not accepted: {e}");
            Err(e)
        }
    }
}
