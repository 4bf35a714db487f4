//! Discovery caching behind a registry-backed client.

use crate::common::TestHarness;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use toolbridge_mcp::{
    Client, DiscoveryConfig, ElicitInput, FnTool, Result, Tool, ToolDefinition, ToolDiscovery,
    ToolRegistrar, ToolRegistry,
};

struct ProjectDiscovery {
    default_project: Option<String>,
    calls: AtomicUsize,
}

#[async_trait]
impl ToolDiscovery for ProjectDiscovery {
    async fn discover(&self, config: Option<&DiscoveryConfig>) -> Result<Vec<Arc<dyn Tool>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut tools: Vec<Arc<dyn Tool>> = vec![
            FnTool::shared(
                ToolDefinition::new("List Projects", "x").read_only(true),
                |_, _| async { Ok(json!([])) },
            ),
            FnTool::shared(ToolDefinition::new("Create Project", "x"), |_, _| async {
                Ok(json!({}))
            }),
        ];
        if self.default_project.is_some() {
            tools.push(FnTool::shared(
                ToolDefinition::new("Current Project", "x").read_only(true),
                |_, _| async { Ok(json!({})) },
            ));
        }
        Ok(match config {
            Some(config) => config.filter(tools, Some("tracker")),
            None => tools,
        })
    }
}

struct TrackerClient {
    registry: Mutex<ToolRegistry>,
    discovery: Arc<ProjectDiscovery>,
    config: Mutex<DiscoveryConfig>,
}

impl TrackerClient {
    fn new(default_project: Option<&str>) -> Self {
        let discovery = Arc::new(ProjectDiscovery {
            default_project: default_project.map(str::to_string),
            calls: AtomicUsize::new(0),
        });
        Self {
            registry: Mutex::new(ToolRegistry::new(discovery.clone())),
            discovery,
            config: Mutex::new(DiscoveryConfig::default()),
        }
    }

    fn discovery_calls(&self) -> usize {
        self.discovery.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Client for TrackerClient {
    fn name(&self) -> &str {
        "Tracker"
    }

    fn prefix(&self) -> &str {
        "tracker"
    }

    async fn register_tools(
        &self,
        registrar: &mut dyn ToolRegistrar,
        _elicitor: Arc<dyn ElicitInput>,
    ) -> Result<()> {
        let config = self.config.lock().await.clone();
        self.registry
            .lock()
            .await
            .register_all_tools(registrar, Some(&config))
            .await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_runtime_configuration_shapes_tool_set() {
    let without = TrackerClient::new(None);
    let with = TrackerClient::new(Some("p1"));

    let mut a = TestHarness::new();
    a.server.add_client(&without).await.unwrap();
    let mut b = TestHarness::new();
    b.server.add_client(&with).await.unwrap();

    assert!(!a.server.has_tool("tracker_current_project"));
    assert!(b.server.has_tool("tracker_current_project"));
}

#[tokio::test]
async fn test_reregistration_with_same_config_reuses_discovery() {
    let client = TrackerClient::new(None);

    let mut first = TestHarness::new();
    first.server.add_client(&client).await.unwrap();
    let mut second = TestHarness::new();
    second.server.add_client(&client).await.unwrap();

    assert_eq!(client.discovery_calls(), 1);
    assert_eq!(second.server.tool_count(), 2);
}

#[tokio::test]
async fn test_changed_exclusions_trigger_one_rediscovery() {
    let client = TrackerClient::new(None);

    let mut first = TestHarness::new();
    first.server.add_client(&client).await.unwrap();

    *client.config.lock().await = DiscoveryConfig::default().exclude("tracker_create_project");
    let mut second = TestHarness::new();
    second.server.add_client(&client).await.unwrap();
    let mut third = TestHarness::new();
    third.server.add_client(&client).await.unwrap();

    assert_eq!(client.discovery_calls(), 2);
    assert!(!second.server.has_tool("tracker_create_project"));
    assert!(second.server.has_tool("tracker_list_projects"));
}

#[tokio::test]
async fn test_read_only_discovery() {
    let client = TrackerClient::new(Some("p1"));
    *client.config.lock().await = DiscoveryConfig::read_only();

    let mut harness = TestHarness::new();
    harness.server.add_client(&client).await.unwrap();

    let names: Vec<String> = harness
        .server
        .tool_summaries()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(
        names,
        vec!["tracker_list_projects", "tracker_current_project"]
    );
}

#[tokio::test]
async fn test_custom_tools_are_appended() {
    let client = TrackerClient::new(None);
    *client.config.lock().await = DiscoveryConfig::default().with_custom_tool(FnTool::shared(
        ToolDefinition::new("Ping", "x").read_only(true),
        |_, _| async { Ok(json!("pong")) },
    ));

    let mut harness = TestHarness::new();
    harness.server.add_client(&client).await.unwrap();

    let result = harness.call("tracker_ping", json!({})).await;
    assert_eq!(crate::common::text_of(&result), r#""pong""#);
}
