//! Registration and naming through the server facade.

use crate::common::{AcmeClient, TestHarness, list_things_definition};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use toolbridge_mcp::{
    Client, ElicitInput, Error, FnTool, HealthClient, Result, Tool, ToolDefinition, ToolRegistrar,
};

struct NamedClient {
    name: &'static str,
    prefix: &'static str,
    titles: Vec<&'static str>,
}

#[async_trait]
impl Client for NamedClient {
    fn name(&self) -> &str {
        self.name
    }

    fn prefix(&self) -> &str {
        self.prefix
    }

    async fn register_tools(
        &self,
        registrar: &mut dyn ToolRegistrar,
        _elicitor: Arc<dyn ElicitInput>,
    ) -> Result<()> {
        for title in &self.titles {
            let tool: Arc<dyn Tool> =
                FnTool::shared(ToolDefinition::new(*title, "x"), |_, _| async {
                    Ok(json!(null))
                });
            registrar.register(tool)?;
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_acme_list_things_naming() {
    let harness = TestHarness::with_acme().await;

    let descriptors = harness.server.tool_descriptors();
    let list = descriptors
        .iter()
        .find(|t| t.name == "acme_list_things")
        .expect("acme_list_things registered");
    assert_eq!(list.title.as_deref(), Some("Acme: List Things"));

    let names: Vec<String> = descriptors.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "acme_list_things",
            "acme_delete_thing",
            "acme_flaky",
            "acme_crash",
            "acme_who_am_i",
        ]
    );
}

#[tokio::test]
async fn test_descriptor_carries_schema_description_and_annotations() {
    let harness = TestHarness::with_acme().await;
    let descriptors = harness.server.tool_descriptors();
    let list = &descriptors[0];

    assert_eq!(
        list.input_schema.get("properties"),
        Some(&json!({
            "project_id": {"type": "string", "description": "Project to list"},
            "limit": {"type": "integer", "default": 10, "description": "Page size"}
        }))
    );
    assert_eq!(
        list.description.as_deref(),
        Some(
            toolbridge_mcp::description::build_description(&list_things_definition()).as_str()
        )
    );
    let annotations = list.annotations.as_ref().unwrap();
    assert_eq!(annotations.read_only_hint, Some(true));

    let delete = &descriptors[1];
    assert_eq!(
        delete.annotations.as_ref().unwrap().destructive_hint,
        Some(true)
    );
}

#[tokio::test]
async fn test_same_title_across_clients_gets_distinct_names() {
    let mut harness = TestHarness::new();
    for (name, prefix) in [("Alpha", "alpha"), ("Beta", "beta")] {
        harness
            .server
            .add_client(&NamedClient {
                name,
                prefix,
                titles: vec!["List Projects"],
            })
            .await
            .unwrap();
    }

    assert!(harness.server.has_tool("alpha_list_projects"));
    assert!(harness.server.has_tool("beta_list_projects"));
    assert_eq!(harness.server.tool_count(), 2);
}

#[tokio::test]
async fn test_identical_prefix_and_title_is_duplicate() {
    let mut harness = TestHarness::new();
    let client = NamedClient {
        name: "Alpha",
        prefix: "alpha",
        titles: vec!["List Projects"],
    };
    harness.server.add_client(&client).await.unwrap();

    let err = harness.server.add_client(&client).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateTool { .. }));
    assert!(err.to_string().contains("alpha_list_projects"));
}

#[tokio::test]
async fn test_whitespace_variants_collide_after_slugging() {
    let mut harness = TestHarness::new();
    let err = harness
        .server
        .add_client(&NamedClient {
            name: "Alpha",
            prefix: "alpha",
            titles: vec!["List Projects", "list   projects"],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateTool { .. }));
    assert_eq!(harness.server.tool_count(), 0);
}

#[tokio::test]
async fn test_health_counts_every_client() {
    let mut harness = TestHarness::new();
    let health = HealthClient::for_server(&harness.server);
    harness.server.add_client(&health).await.unwrap();
    harness.server.add_client(&AcmeClient::new()).await.unwrap();

    let result = harness.call("server_health", json!({})).await;
    let body: serde_json::Value =
        serde_json::from_str(&crate::common::text_of(&result)).unwrap();
    assert_eq!(body["tool_count"], 6);
    assert_eq!(body["server_name"], "test-bridge");
}

#[test]
fn test_get_info_enables_resources_when_registered() {
    use rmcp::ServerHandler;

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let harness = runtime.block_on(TestHarness::with_acme());
    let info = harness.server.get_info();
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.resources.is_some());
}
