//! Health check client.
//!
//! Registers a single `server_health` tool that reports server status,
//! version and the number of registered tools.

use crate::client::{Client, ToolRegistrar};
use crate::definition::{JsonObject, ToolDefinition};
use crate::elicit::ElicitInput;
use crate::error::{Result, ToolError};
use crate::server::McpServer;
use crate::tool::{Tool, ToolContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status ("healthy").
    pub status: String,
    /// Server name.
    pub server_name: String,
    /// Server version.
    pub version: String,
    /// Number of registered tools.
    pub tool_count: usize,
}

struct HealthTool {
    definition: ToolDefinition,
    server_name: String,
    version: String,
    tool_count: Arc<AtomicUsize>,
}

#[async_trait]
impl Tool for HealthTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _args: JsonObject, _ctx: ToolContext) -> std::result::Result<Value, ToolError> {
        let response = HealthResponse {
            status: "healthy".to_string(),
            server_name: self.server_name.clone(),
            version: self.version.clone(),
            tool_count: self.tool_count.load(Ordering::SeqCst),
        };
        Ok(serde_json::to_value(response)?)
    }
}

/// Built-in client exposing the health tool under the `server` prefix.
pub struct HealthClient {
    server_name: String,
    version: String,
    tool_count: Arc<AtomicUsize>,
}

impl HealthClient {
    /// Create a health client.
    ///
    /// `tool_count` is read at call time, so it reflects clients added
    /// after this one.
    pub fn new(
        server_name: impl Into<String>,
        version: impl Into<String>,
        tool_count: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            version: version.into(),
            tool_count,
        }
    }

    /// Create a health client reporting on `server`.
    pub fn for_server(server: &McpServer) -> Self {
        Self::new(
            server.config().name.clone(),
            server.config().version.clone(),
            server.tool_counter(),
        )
    }

    fn definition() -> ToolDefinition {
        ToolDefinition::new("Health", "Check server health and status.")
            .with_output_format("JSON object with status, server_name, version and tool_count")
            .with_hint("Use this to confirm the server is reachable before calling other tools")
            .read_only(true)
            .idempotent(true)
            .open_world(false)
    }
}

#[async_trait]
impl Client for HealthClient {
    fn name(&self) -> &str {
        "Server"
    }

    fn prefix(&self) -> &str {
        "server"
    }

    async fn register_tools(
        &self,
        registrar: &mut dyn ToolRegistrar,
        _elicitor: Arc<dyn ElicitInput>,
    ) -> Result<()> {
        registrar.register(Arc::new(HealthTool {
            definition: Self::definition(),
            server_name: self.server_name.clone(),
            version: self.version.clone(),
            tool_count: Arc::clone(&self.tool_count),
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
