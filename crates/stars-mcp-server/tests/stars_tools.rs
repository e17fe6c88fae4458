//! Drives registered tools end to end against a mock Stars API

use std::sync::Arc;

use mockito::Matcher;
use serde_json::{Value, json};
use stars_api::{StarsAdapter, StarsApiConfig, TracingObserver, UrlValidationConfig};
use stars_mcp_server::tools::{
    COMPARE_CONTRIBUTIONS_TOOL_NAME, CREATE_LINK_TOOL_NAME, EXPORT_CONTRIBUTIONS_TOOL_NAME,
    ToolRegistry,
};
use url::Url;

fn adapter(server: &mockito::Server) -> Arc<StarsAdapter> {
    let endpoint = Url::parse(&server.url()).unwrap();
    Arc::new(
        StarsAdapter::from_config(
            &StarsApiConfig::for_tests(endpoint),
            UrlValidationConfig::default(),
            Arc::new(TracingObserver),
        )
        .unwrap(),
    )
}

fn profile(contributions: Value) -> String {
    json!({ "data": { "publicProfile": { "contributions": contributions } } }).to_string()
}

async fn call(server: &mockito::Server, tool: &str, arguments: Value) -> Value {
    let registry = ToolRegistry::stars();
    let envelope = registry
        .get(tool)
        .unwrap()
        .call(adapter(server), arguments)
        .await;
    serde_json::to_value(envelope).unwrap()
}

#[test_log::test(tokio::test)]
async fn exports_a_public_profile_as_csv() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "variables": { "username": "octocat" } })))
        .with_status(200)
        .with_body(profile(json!([
            { "id": "1", "type": "BLOGPOST", "date": "2024-01-02", "title": "Hello, world", "url": "https://a.dev" },
            { "id": "2", "type": "SPEAKING", "date": "2024-03-04", "title": "Talk", "url": "https://b.dev" },
        ])))
        .create_async()
        .await;

    let envelope = call(
        &server,
        EXPORT_CONTRIBUTIONS_TOOL_NAME,
        json!({ "username": "octocat", "format": "csv", "sort_by": "date" }),
    )
    .await;

    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"]["count"], 2);
    assert_eq!(
        envelope["data"]["content"],
        "title,type,date,url,id\n\
         Talk,SPEAKING,2024-03-04,https://b.dev,2\n\
         \"Hello, world\",BLOGPOST,2024-01-02,https://a.dev,1\n"
    );
}

#[test_log::test(tokio::test)]
async fn compares_two_users_fetched_concurrently() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "variables": { "username": "ada" } })))
        .with_body(profile(json!([
            { "id": "1", "type": "BLOGPOST", "date": "2023-05-01", "title": "A", "url": "https://a.dev" },
            { "id": "2", "type": "BLOGPOST", "date": "2024-05-01", "title": "B", "url": "https://b.dev" },
        ])))
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "variables": { "username": "grace" } })))
        .with_body(profile(json!([
            { "id": "3", "type": "SPEAKING", "date": "2024-06-01", "title": "C", "url": "https://c.dev" },
        ])))
        .create_async()
        .await;

    let envelope = call(
        &server,
        COMPARE_CONTRIBUTIONS_TOOL_NAME,
        json!({ "username1": "ada", "username2": "grace", "metric": "total" }),
    )
    .await;

    assert_eq!(envelope["success"], true, "{envelope}");
    assert_eq!(envelope["data"]["user1_count"], 2);
    assert_eq!(envelope["data"]["user2_count"], 1);
    assert_eq!(
        envelope["data"]["comparison"],
        json!({ "metric": "total", "difference": 1, "ratio": 2.0 })
    );
}

#[test_log::test(tokio::test)]
async fn server_errors_are_retried_then_reported() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let envelope = call(
        &server,
        CREATE_LINK_TOOL_NAME,
        json!({ "link": "https://octo.dev", "platform": "twitter" }),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(envelope["success"], false);
    assert!(envelope["data"].is_null());
}
