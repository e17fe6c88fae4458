use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorCode, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde_json::Value;
use stars_api::{ResultEnvelope, StarsAdapter};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::McpError;
use crate::server_info::ServerInfoConfig;
use crate::tools::ToolRegistry;

#[derive(Clone)]
pub(super) struct Running {
    pub(super) adapter: Arc<StarsAdapter>,
    pub(super) registry: Arc<ToolRegistry>,
    pub(super) server_info: ServerInfoConfig,
    pub(super) cancellation_token: CancellationToken,
}

impl Running {
    fn list_tools_impl(&self) -> ListToolsResult {
        ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: self.registry.tools(),
        }
    }

    async fn call_tool_impl(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.registry.get(name).ok_or_else(|| tool_not_found(name))?;
        let arguments = Value::Object(arguments.unwrap_or_default());

        let envelope = tool.call(self.adapter.clone(), arguments).await;
        if let Some(error) = envelope.error() {
            debug!(tool = name, error, "Tool call failed");
        }
        envelope_result(&envelope)
    }
}

impl ServerHandler for Running {
    #[tracing::instrument(skip_all, fields(stars.mcp.tool_name = request.name.as_ref(), stars.mcp.request_id = %context.id.clone()))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call_tool_impl(&request.name, request.arguments).await
    }

    #[tracing::instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.list_tools_impl())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: self.server_info.implementation(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn tool_not_found(name: &str) -> McpError {
    McpError::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("Tool {name} not found"),
        None,
    )
}

/// Every envelope goes back as JSON; failed envelopes are flagged as tool errors
fn envelope_result(envelope: &ResultEnvelope) -> Result<CallToolResult, McpError> {
    let content = vec![Content::json(envelope)?];
    Ok(if envelope.is_success() {
        CallToolResult::success(content)
    } else {
        CallToolResult::error(content)
    })
}
