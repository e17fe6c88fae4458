use std::sync::Arc;

use futures::FutureExt as _;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use stars_api::operation::ProfileUpdate;
use stars_api::{OperationRequest, StarsAdapter};

use super::{NoInput, ToolFuture, ToolRegistry, operation};
use crate::schema_from_type;

pub const UPDATE_PROFILE_TOOL_NAME: &str = "update_profile";
pub const GET_USER_DATA_TOOL_NAME: &str = "get_user_data";
pub const GET_USER_TOOL_NAME: &str = "get_user";

/// Input for the profile update tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct UpdateProfileInput {
    /// The profile fields to change. Absent fields keep their current value.
    data: ProfileUpdate,
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            Tool::new(
                UPDATE_PROFILE_TOOL_NAME,
                "Updates the nominee profile of the authenticated user (bio, company, location, ...).",
                schema_from_type!(UpdateProfileInput),
            ),
            update_profile,
        )
        .register(
            Tool::new(
                GET_USER_DATA_TOOL_NAME,
                "Returns the authenticated user with their nominee profile, links and contributions.",
                schema_from_type!(NoInput),
            ),
            get_user_data,
        )
        .register(
            Tool::new(
                GET_USER_TOOL_NAME,
                "Returns the account of the authenticated user.",
                schema_from_type!(NoInput),
            ),
            get_user,
        );
}

fn update_profile(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, |input: UpdateProfileInput| {
        OperationRequest::UpdateProfile(input.data)
    })
}

fn get_user_data(adapter: Arc<StarsAdapter>, _arguments: Value) -> ToolFuture {
    async move { adapter.execute(OperationRequest::GetUserData).await }.boxed()
}

fn get_user(adapter: Arc<StarsAdapter>, _arguments: Value) -> ToolFuture {
    async move { adapter.execute(OperationRequest::GetUser).await }.boxed()
}
