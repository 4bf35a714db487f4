//! `RestClient` registered on a server and called through the facade.

use crate::common::{FakeBackend, tracker_config};
use rmcp::model::{CallToolResult, ErrorCode, RawContent, ResourceContents};
use serde_json::{Value, json};
use std::sync::Arc;
use toolbridge_mcp::{CollectingReporter, DiscoveryConfig, McpServer, ServerConfig};
use toolbridge_mcp_rest::{Auth, RestClient};

struct Setup {
    server: McpServer,
    reporter: Arc<CollectingReporter>,
    _backend: FakeBackend,
}

async fn setup_with(discovery: DiscoveryConfig) -> Setup {
    let backend = FakeBackend::start().await;
    let client = RestClient::new(&tracker_config(&backend.base_url), Auth::None)
        .unwrap()
        .with_discovery(discovery);

    let reporter = Arc::new(CollectingReporter::new());
    let mut server = McpServer::new(ServerConfig::new("rest-test")).with_reporter(reporter.clone());
    server.add_client(&client).await.unwrap();

    Setup {
        server,
        reporter,
        _backend: backend,
    }
}

async fn setup() -> Setup {
    setup_with(DiscoveryConfig::default()).await
}

async fn call(setup: &Setup, name: &str, args: Value) -> CallToolResult {
    setup
        .server
        .call_tool_by_name(name, args.as_object().cloned())
        .await
}

fn text(result: &CallToolResult) -> String {
    match &result.content[0].raw {
        RawContent::Text(t) => t.text.clone(),
        _ => panic!("expected text content"),
    }
}

fn json_of(result: &CallToolResult) -> Value {
    serde_json::from_str(&text(result)).unwrap()
}

#[tokio::test]
async fn test_tools_are_registered_under_prefix() {
    let setup = setup().await;
    let names: Vec<String> = setup
        .server
        .tool_summaries()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "tracker_list_issues",
            "tracker_create_issue",
            "tracker_get_issue",
            "tracker_delete_issue",
        ]
    );
    assert_eq!(
        setup.server.resource_uri_templates(),
        vec!["tracker://issue/{id}"]
    );
}

#[tokio::test]
async fn test_list_uses_client_default_and_selects() {
    let setup = setup().await;
    let result = call(&setup, "tracker_list_issues", json!({"label": ["bug", "ui"]})).await;

    assert_eq!(result.is_error, Some(false));
    assert_eq!(
        json_of(&result),
        json!({"project": "core", "query": "limit=20&label=bug&label=ui"})
    );
}

#[tokio::test]
async fn test_create_sends_body_fields() {
    let setup = setup().await;
    let result = call(
        &setup,
        "tracker_create_issue",
        json!({"project": "web", "title": "Broken", "priority": "high"}),
    )
    .await;

    assert_eq!(result.is_error, Some(false));
    assert_eq!(
        json_of(&result),
        json!({"project": "web", "created": {"priority": "high", "title": "Broken"}})
    );
}

#[tokio::test]
async fn test_enum_violation_never_reaches_backend() {
    let setup = setup().await;
    let result = call(
        &setup,
        "tracker_create_issue",
        json!({"title": "Broken", "priority": "urgent"}),
    )
    .await;

    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).starts_with("Invalid arguments for tool 'tracker_create_issue':"));
}

#[tokio::test]
async fn test_not_found_is_domain_error() {
    let setup = setup().await;
    let result = call(&setup, "tracker_get_issue", json!({"id": "missing"})).await;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text(&result),
        r#"Tracker API error (status 404): {"detail":"Issue missing not found"}"#
    );
    assert_eq!(setup.reporter.count(), 0);
}

#[tokio::test]
async fn test_server_error_is_unexpected_and_reported() {
    let setup = setup().await;
    let result = call(&setup, "tracker_get_issue", json!({"id": "crash"})).await;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text(&result),
        "Tool execution failed: API error (status 500): boom"
    );
    assert_eq!(setup.reporter.count(), 1);
}

#[tokio::test]
async fn test_delete_returns_null() {
    let setup = setup().await;
    let result = call(&setup, "tracker_delete_issue", json!({"id": "9"})).await;
    assert_eq!(result.is_error, Some(false));
    assert_eq!(text(&result), "null");
}

#[tokio::test]
async fn test_read_only_discovery_hides_mutations() {
    let setup = setup_with(DiscoveryConfig::read_only()).await;
    assert!(setup.server.has_tool("tracker_list_issues"));
    assert!(setup.server.has_tool("tracker_get_issue"));
    assert!(!setup.server.has_tool("tracker_create_issue"));
    assert!(!setup.server.has_tool("tracker_delete_issue"));
}

#[tokio::test]
async fn test_resource_read_selects_data() {
    let setup = setup().await;
    let result = setup
        .server
        .read_resource_uri("tracker://issue/42")
        .await
        .unwrap();

    match &result.contents[0] {
        ResourceContents::TextResourceContents { text, .. } => {
            let body: Value = serde_json::from_str(text).unwrap();
            assert_eq!(body, json!({"id": "42", "title": "Issue 42"}));
        }
        other => panic!("unexpected contents: {other:?}"),
    }
}

#[tokio::test]
async fn test_resource_not_found_upstream() {
    let setup = setup().await;
    let err = setup
        .server
        .read_resource_uri("tracker://issue/missing")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
    assert!(err.message.contains("status 404"));
}
