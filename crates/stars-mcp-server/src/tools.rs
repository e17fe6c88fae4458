//! The MCP tools exposed by the server.
//!
//! Every tool is a plain function from the shared [`StarsAdapter`] and the raw call arguments to
//! a [`ResultEnvelope`]. Bad arguments never reach the adapter: they come back as a failed
//! envelope starting with `Invalid input:`.

mod analytics;
mod contributions;
mod export;
mod links;
mod profile;
mod public;

use std::sync::Arc;

use futures::FutureExt as _;
use futures::future::BoxFuture;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stars_api::{OperationRequest, ResultEnvelope, StarsAdapter};

pub use analytics::{
    COMPARE_CONTRIBUTIONS_TOOL_NAME, CONTRIBUTIONS_STATS_TOOL_NAME, SEARCH_CONTRIBUTIONS_TOOL_NAME,
};
pub use contributions::{
    CREATE_CONTRIBUTION_TOOL_NAME, CREATE_CONTRIBUTIONS_TOOL_NAME, DELETE_CONTRIBUTION_TOOL_NAME,
    UPDATE_CONTRIBUTION_TOOL_NAME,
};
pub use export::EXPORT_CONTRIBUTIONS_TOOL_NAME;
pub use links::{CREATE_LINK_TOOL_NAME, DELETE_LINK_TOOL_NAME, UPDATE_LINK_TOOL_NAME};
pub use profile::{GET_USER_DATA_TOOL_NAME, GET_USER_TOOL_NAME, UPDATE_PROFILE_TOOL_NAME};
pub use public::GET_STARS_TOOL_NAME;

/// The pending result of a tool call
pub type ToolFuture = BoxFuture<'static, ResultEnvelope>;

/// Runs a tool against the adapter with the raw call arguments
pub type ToolHandler = fn(Arc<StarsAdapter>, Value) -> ToolFuture;

/// A tool definition together with the function that runs it
#[derive(Clone)]
pub struct RegisteredTool {
    pub tool: Tool,
    handler: ToolHandler,
}

impl RegisteredTool {
    pub fn call(&self, adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
        (self.handler)(adapter, arguments)
    }
}

/// The tools available to MCP clients, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every GitHub Stars tool
    pub fn stars() -> Self {
        let mut registry = Self::new();
        contributions::register(&mut registry);
        links::register(&mut registry);
        profile::register(&mut registry);
        public::register(&mut registry);
        analytics::register(&mut registry);
        export::register(&mut registry);
        registry
    }

    /// Add a tool. A tool registered under an existing name replaces it.
    pub fn register(&mut self, tool: Tool, handler: ToolHandler) -> &mut Self {
        let entry = RegisteredTool { tool, handler };
        match self.tools.iter_mut().find(|t| t.tool.name == entry.tool.name) {
            Some(existing) => *existing = entry,
            None => self.tools.push(entry),
        }
        self
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.tool.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.tool.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Input for tools that take no arguments
#[derive(JsonSchema, Deserialize, Debug, Default)]
pub(crate) struct NoInput {}

/// Input for tools addressing a single entity
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct IdInput {
    /// The identifier of the entity
    pub(crate) id: String,
}

/// Input for tools reading public data of a user
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct UsernameInput {
    /// The GitHub username
    pub(crate) username: String,
}

pub(crate) fn parse_input<T: DeserializeOwned>(arguments: Value) -> Result<T, ResultEnvelope> {
    serde_json::from_value(arguments).map_err(|e| ResultEnvelope::failure(format!("Invalid input: {e}")))
}

/// Parse the arguments, build the request and hand it to the adapter
pub(crate) fn operation<T, F>(adapter: Arc<StarsAdapter>, arguments: Value, build: F) -> ToolFuture
where
    T: DeserializeOwned,
    F: FnOnce(T) -> OperationRequest,
{
    let request = parse_input(arguments).map(build);
    async move {
        match request {
            Ok(request) => adapter.execute(request).await,
            Err(invalid) => invalid,
        }
    }
    .boxed()
}
