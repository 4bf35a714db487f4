//! The error boundary as seen through `call_tool_by_name`.

use crate::common::{TestHarness, text_of};
use serde_json::{Value, json};
use toolbridge_mcp::telemetry::ErrorKind;

#[tokio::test]
async fn test_success_fills_defaults_and_returns_compact_json() {
    let harness = TestHarness::with_acme().await;
    let result = harness
        .call("acme_list_things", json!({"project_id": "p1"}))
        .await;

    assert_eq!(result.is_error, Some(false));
    let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(body["project"], "p1");
    assert_eq!(body["limit"], 10);
    assert!(!text_of(&result).contains('\n'));
}

#[tokio::test]
async fn test_missing_required_argument() {
    let harness = TestHarness::with_acme().await;
    let result = harness.call("acme_list_things", json!({})).await;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text_of(&result),
        "Invalid arguments for tool 'acme_list_things': missing required parameter 'project_id'"
    );
    assert_eq!(harness.reporter.count(), 0);
}

#[tokio::test]
async fn test_mismatched_argument_type() {
    let harness = TestHarness::with_acme().await;
    let result = harness
        .call("acme_list_things", json!({"project_id": "p1", "limit": "ten"}))
        .await;

    assert_eq!(result.is_error, Some(true));
    let text = text_of(&result);
    assert!(text.starts_with("Invalid arguments for tool 'acme_list_things':"));
    assert!(text.contains("'limit'"));
    assert!(text.contains("expected integer, got string"));
}

#[tokio::test]
async fn test_domain_error_passes_through_without_telemetry() {
    let harness = TestHarness::with_acme().await;
    let result = harness.call("acme_delete_thing", json!({"id": "42"})).await;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(text_of(&result), "Thing 42 cannot be deleted");
    assert_eq!(harness.reporter.count(), 0);
}

#[tokio::test]
async fn test_unexpected_error_reported_exactly_once() {
    let harness = TestHarness::with_acme().await;
    let result = harness.call("acme_flaky", json!({})).await;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text_of(&result),
        "Tool execution failed: upstream reset the connection"
    );
    let reports = harness.reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].tool, "acme_flaky");
    assert_eq!(reports[0].kind, ErrorKind::Error);
}

#[tokio::test]
async fn test_panic_does_not_escape() {
    let harness = TestHarness::with_acme().await;
    let result = harness.call("acme_crash", json!({})).await;

    assert_eq!(result.is_error, Some(true));
    assert!(
        text_of(&result).starts_with("Tool execution failed with unknown error: index out of bounds")
    );
    let reports = harness.reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ErrorKind::Panic);

    // The server keeps working after a panic.
    let after = harness
        .call("acme_list_things", json!({"project_id": "p1"}))
        .await;
    assert_eq!(after.is_error, Some(false));
}

#[tokio::test]
async fn test_every_failure_kind_yields_one_text_item() {
    let harness = TestHarness::with_acme().await;
    let calls = [
        ("acme_list_things", json!({})),
        ("acme_delete_thing", json!({"id": "1"})),
        ("acme_flaky", json!({})),
        ("acme_crash", json!({})),
        ("acme_missing", json!({})),
    ];

    for (name, args) in calls {
        let result = harness.call(name, args).await;
        assert_eq!(result.is_error, Some(true), "{name} should fail");
        assert_eq!(result.content.len(), 1, "{name} should have one item");
        text_of(&result);
    }

    // Only the unexpected error and the panic are reported.
    assert_eq!(harness.reporter.count(), 2);
}

#[tokio::test]
async fn test_context_carries_global_tool_name() {
    let harness = TestHarness::with_acme().await;
    let result = harness.call("acme_who_am_i", json!({})).await;
    assert_eq!(text_of(&result), r#""acme_who_am_i""#);
}

#[tokio::test]
async fn test_concurrent_invocations_are_independent() {
    let harness = TestHarness::with_acme().await;
    let (a, b, c) = tokio::join!(
        harness.call("acme_list_things", json!({"project_id": "a"})),
        harness.call("acme_crash", json!({})),
        harness.call("acme_list_things", json!({"project_id": "c"})),
    );
    assert_eq!(a.is_error, Some(false));
    assert_eq!(b.is_error, Some(true));
    assert_eq!(c.is_error, Some(false));
}
