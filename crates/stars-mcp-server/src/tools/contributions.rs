use std::sync::Arc;

use futures::FutureExt as _;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use stars_api::operation::{ContributionInput, ContributionUpdate};
use stars_api::{OperationRequest, StarsAdapter};

use super::{IdInput, ToolFuture, ToolRegistry, operation};
use crate::schema_from_type;

pub const CREATE_CONTRIBUTION_TOOL_NAME: &str = "create_contribution";
pub const CREATE_CONTRIBUTIONS_TOOL_NAME: &str = "create_contributions";
pub const UPDATE_CONTRIBUTION_TOOL_NAME: &str = "update_contribution";
pub const DELETE_CONTRIBUTION_TOOL_NAME: &str = "delete_contribution";

/// Input for the batch creation tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct CreateManyInput {
    /// The contributions to create, at least one
    data: Vec<ContributionInput>,
}

/// Input for the update tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct UpdateInput {
    /// The identifier of the contribution
    id: String,

    /// The fields to change. Absent fields keep their current value.
    data: ContributionUpdate,
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            Tool::new(
                CREATE_CONTRIBUTION_TOOL_NAME,
                "Creates a single contribution (talk, blog post, video, ...) on the profile of the \
                authenticated GitHub Star. The date must be ISO-8601, e.g. `2024-05-01`.",
                schema_from_type!(ContributionInput),
            ),
            create_one,
        )
        .register(
            Tool::new(
                CREATE_CONTRIBUTIONS_TOOL_NAME,
                "Creates several contributions in one request and returns their identifiers in \
                order. Nothing is created if any contribution is invalid.",
                schema_from_type!(CreateManyInput),
            ),
            create_many,
        )
        .register(
            Tool::new(
                UPDATE_CONTRIBUTION_TOOL_NAME,
                "Updates fields of an existing contribution. Only the fields given are sent.",
                schema_from_type!(UpdateInput),
            ),
            update,
        )
        .register(
            Tool::new(
                DELETE_CONTRIBUTION_TOOL_NAME,
                "Deletes a contribution by identifier.",
                schema_from_type!(IdInput),
            ),
            delete,
        );
}

fn create_one(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, OperationRequest::CreateContribution)
}

fn create_many(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    let future = operation(adapter, arguments, |input: CreateManyInput| {
        OperationRequest::CreateContributions(input.data)
    });
    async move { future.await.and_then(created_ids) }.boxed()
}

fn update(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, |input: UpdateInput| {
        OperationRequest::UpdateContribution {
            id: input.id,
            data: input.data,
        }
    })
}

fn delete(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    operation(adapter, arguments, |input: IdInput| {
        OperationRequest::DeleteContribution { id: input.id }
    })
}

/// Reduce a batch creation payload to the created identifiers, in request order
fn created_ids(data: Value) -> Result<Value, String> {
    let created = data
        .get("createContributions")
        .and_then(Value::as_array)
        .ok_or_else(|| "Unexpected response: missing `createContributions`".to_string())?;

    let ids = created
        .iter()
        .map(|item| item.get("id").cloned().unwrap_or(Value::Null))
        .collect::<Vec<_>>();

    Ok(json!({ "ids": ids }))
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::tools::testing;

    async fn call(url: &str, name: &str, arguments: Value) -> stars_api::ResultEnvelope {
        ToolRegistry::stars()
            .get(name)
            .unwrap()
            .call(testing::adapter(url), arguments)
            .await
    }

    #[tokio::test]
    async fn create_contribution_sends_the_mutation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "variables": {
                    "data": {
                        "title": "Rust at scale",
                        "url": "https://example.com/talk",
                        "description": "",
                        "type": "SPEAKING",
                        "date": "2024-05-01T00:00:00"
                    }
                }
            })))
            .with_status(200)
            .with_body(testing::data(json!({ "createContribution": { "id": "c1" } })))
            .expect(1)
            .create_async()
            .await;

        let envelope = call(
            &server.url(),
            CREATE_CONTRIBUTION_TOOL_NAME,
            json!({
                "title": "Rust at scale",
                "url": "https://example.com/talk",
                "type": "SPEAKING",
                "date": "2024-05-01"
            }),
        )
        .await;

        mock.assert_async().await;
        assert_eq!(envelope.data(), Some(&json!({ "createContribution": { "id": "c1" } })));
    }

    #[tokio::test]
    async fn batch_creation_returns_ids_in_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(testing::data(json!({
                "createContributions": [{ "id": "a" }, { "id": "b" }]
            })))
            .create_async()
            .await;

        let contribution = json!({
            "title": "Post",
            "url": "https://example.com/post",
            "type": "BLOGPOST",
            "date": "2024-01-02"
        });
        let envelope = call(
            &server.url(),
            CREATE_CONTRIBUTIONS_TOOL_NAME,
            json!({ "data": [contribution.clone(), contribution] }),
        )
        .await;

        assert_eq!(envelope.data(), Some(&json!({ "ids": ["a", "b"] })));
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_locally() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;

        let envelope = call(&server.url(), CREATE_CONTRIBUTIONS_TOOL_NAME, json!({ "data": [] })).await;

        mock.assert_async().await;
        assert!(!envelope.is_success());
    }

    #[tokio::test]
    async fn unknown_contribution_type_is_invalid_input() {
        let server = mockito::Server::new_async().await;

        let envelope = call(
            &server.url(),
            CREATE_CONTRIBUTION_TOOL_NAME,
            json!({
                "title": "Post",
                "url": "https://example.com/post",
                "type": "PODCASTING",
                "date": "2024-01-02"
            }),
        )
        .await;

        assert!(envelope.error().unwrap().starts_with("Invalid input: unknown variant `PODCASTING`"));
    }

    #[tokio::test]
    async fn update_sends_only_given_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "variables": { "id": "c1", "data": { "title": "New title" } }
            })))
            .with_status(200)
            .with_body(testing::data(json!({ "updateContribution": { "id": "c1" } })))
            .create_async()
            .await;

        let envelope = call(
            &server.url(),
            UPDATE_CONTRIBUTION_TOOL_NAME,
            json!({ "id": "c1", "data": { "title": "New title" } }),
        )
        .await;

        mock.assert_async().await;
        assert!(envelope.is_success());
    }

    #[test]
    fn missing_batch_payload_is_an_error() {
        assert_eq!(
            created_ids(json!({})),
            Err("Unexpected response: missing `createContributions`".to_string())
        );
    }
}
