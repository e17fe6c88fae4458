use stars_api::ApiError;
use tokio::task::JoinError;

/// An error in server initialization
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Stars API client error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not open listener: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start server: {0}")]
    StartupError(#[from] JoinError),

    #[error("Failed to initialize MCP server: {0}")]
    McpInitializeError(#[from] Box<rmcp::service::ServerInitializeError>),
}

/// An MCP tool error
pub type McpError = rmcp::model::ErrorData;
