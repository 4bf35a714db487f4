//! Client resources through the server facade.

use crate::common::TestHarness;
use rmcp::model::{ErrorCode, ResourceContents};
use serde_json::{Value, json};
use toolbridge_mcp::telemetry::ErrorKind;

#[tokio::test]
async fn test_resource_template_is_prefixed() {
    let harness = TestHarness::with_acme().await;
    assert_eq!(
        harness.server.resource_uri_templates(),
        vec!["acme://widget/{id}"]
    );

    let templates = harness.server.resource_templates();
    assert_eq!(templates[0].raw.name, "widget");
    assert_eq!(templates[0].raw.title.as_deref(), Some("Acme: Widget"));
    assert_eq!(
        templates[0].raw.mime_type.as_deref(),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_read_resource_extracts_variables() {
    let harness = TestHarness::with_acme().await;
    let result = harness
        .server
        .read_resource_uri("acme://widget/w-7")
        .await
        .unwrap();

    assert_eq!(result.contents.len(), 1);
    match &result.contents[0] {
        ResourceContents::TextResourceContents {
            text, mime_type, ..
        } => {
            let body: Value = serde_json::from_str(text).unwrap();
            assert_eq!(body, json!({"id": "w-7", "uri": "acme://widget/w-7"}));
            assert_eq!(mime_type.as_deref(), Some("application/json"));
        }
        other => panic!("unexpected contents: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let harness = TestHarness::with_acme().await;
    let err = harness
        .server
        .read_resource_uri("acme://gizmo/1")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
}

#[tokio::test]
async fn test_domain_failure_is_protocol_error() {
    let harness = TestHarness::with_acme().await;
    let err = harness
        .server
        .read_resource_uri("acme://widget/gone")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Widget gone was deleted");
    assert_eq!(harness.reporter.count(), 0);
}

#[tokio::test]
async fn test_handler_panic_is_contained() {
    let harness = TestHarness::with_acme().await;
    let err = harness
        .server
        .read_resource_uri("acme://widget/boom")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert!(err.message.contains("widget store corrupted"));

    let reports = harness.reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ErrorKind::Panic);
    assert_eq!(reports[0].tool, "acme://widget/boom");
}
