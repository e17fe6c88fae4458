use std::sync::Arc;

use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use stars_api::operation::LinkInput;
use stars_api::{OperationRequest, StarsAdapter};

use super::{IdInput, ToolFuture, ToolRegistry, operation};
use crate::schema_from_type;

pub const CREATE_LINK_TOOL_NAME: &str = "create_link";
pub const UPDATE_LINK_TOOL_NAME: &str = "update_link";
pub const DELETE_LINK_TOOL_NAME: &str = "delete_link";

/// Input for the link update tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct UpdateLinkInput {
    /// The identifier of the link
    id: String,

    /// The new URL
    link: String,

    /// The platform the link points to, e.g. `TWITTER` or `README`
    platform: String,
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            Tool::new(
                CREATE_LINK_TOOL_NAME,
                "Adds a social or web link to the profile. Platforms: TWITTER, MEDIUM, LINKEDIN, \
                README, STACK_OVERFLOW, DEV_TO, MASTODON, OTHER.",
                schema_from_type!(LinkInput),
            ),
            create,
        )
        .register(
            Tool::new(
                UPDATE_LINK_TOOL_NAME,
                "Replaces the URL and platform of an existing link.",
                schema_from_type!(UpdateLinkInput),
            ),
            update,
        )
        .register(
            Tool::new(
                DELETE_LINK_TOOL_NAME,
                "Deletes a link by identifier.",
                schema_from_type!(IdInput),
            ),
            delete,
        );
}

fn create(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, OperationRequest::CreateLink)
}

fn update(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, |input: UpdateLinkInput| {
        OperationRequest::UpdateLink {
            id: input.id,
            link: LinkInput {
                link: input.link,
                platform: input.platform,
            },
        }
    })
}

fn delete(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, |input: IdInput| OperationRequest::DeleteLink { id: input.id })
}
