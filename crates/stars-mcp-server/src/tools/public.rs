//! Public profile reads, shared by the analytics tools

use std::sync::Arc;

use chrono::NaiveDateTime;
use rmcp::model::Tool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stars_api::operation::parse_iso8601;
use stars_api::{OperationRequest, StarsAdapter};

use super::{ToolFuture, ToolRegistry, UsernameInput, operation};
use crate::schema_from_type;

pub const GET_STARS_TOOL_NAME: &str = "get_stars";

/// A contribution as listed on a public profile. Fields the API leaves out stay empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Contribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,

    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl Contribution {
    pub(crate) fn parsed_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_iso8601)
    }

    /// The contribution type, or `UNKNOWN` when the API did not report one
    pub(crate) fn kind_or_unknown(&self) -> &str {
        self.kind.as_deref().unwrap_or("UNKNOWN")
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(
        Tool::new(
            GET_STARS_TOOL_NAME,
            "Returns the public GitHub Stars profile of a user, including all their \
            contributions. Does not require authentication.",
            schema_from_type!(UsernameInput),
        ),
        get_stars,
    );
}

fn get_stars(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, |input: UsernameInput| OperationRequest::GetStars {
        username: input.username,
    })
}

/// Fetch the public contributions of `username`. A user without a profile has none.
pub(crate) async fn contributions(
    adapter: &StarsAdapter,
    username: &str,
) -> Result<Vec<Contribution>, String> {
    let data = adapter
        .execute(OperationRequest::GetStars {
            username: username.to_string(),
        })
        .await
        .into_result()?;

    match data.pointer("/publicProfile/contributions") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(contributions) => serde_json::from_value(contributions.clone())
            .map_err(|e| format!("Unexpected contributions payload: {e}")),
    }
}
