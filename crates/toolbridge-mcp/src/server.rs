//! The MCP server facade.
//!
//! [`McpServer`] owns every registered tool and resource across all
//! backend clients. It names them globally, answers `tools/list` and
//! `resources/templates/list`, and routes `tools/call` and
//! `resources/read` through the [`ErrorBoundary`].

use crate::client::{Client, ResourceRegistrar, ToolRegistrar};
use crate::definition::{JsonObject, ToolDefinition};
use crate::description::build_description;
use crate::dispatch::{ErrorBoundary, Failure};
use crate::elicit::{ElicitInput, PeerElicitor};
use crate::error::{Error, Result};
use crate::naming::{global_tool_name, global_tool_title, resource_uri_template};
use crate::resources::{ResourceDefinition, ResourceHandler, UriTemplate};
use crate::schema::build_input_schema;
use crate::telemetry::{ErrorReporter, TracingReporter};
use crate::tool::{Tool, ToolContext};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation,
    ListResourceTemplatesResult, ListToolsResult, PaginatedRequestParam, ReadResourceRequestParam,
    ReadResourceResult, ResourceTemplate, ServerCapabilities, ServerInfo, ToolAnnotations,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Server metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Server name reported to clients.
    pub name: String,
    /// Server version reported to clients.
    pub version: String,
    /// Usage instructions for the connected agent.
    pub instructions: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "toolbridge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
        }
    }
}

impl ServerConfig {
    /// Create a config with a name and the crate version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

struct ToolEntry {
    descriptor: rmcp::model::Tool,
    tool: Arc<dyn Tool>,
    client: String,
}

struct ResourceEntry {
    template: UriTemplate,
    definition: ResourceDefinition,
    client: String,
    handler: Arc<dyn ResourceHandler>,
}

/// Summary of a registered tool, for listings outside the protocol.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSummary {
    /// Global name
    pub name: String,
    /// Global title
    pub title: String,
    /// Owning client's name
    pub client: String,
    /// Whether the tool is marked read-only
    pub read_only: bool,
}

/// One MCP server multiplexing many backend clients.
pub struct McpServer {
    config: ServerConfig,
    boundary: ErrorBoundary,
    elicitor: PeerElicitor,
    tools: Vec<ToolEntry>,
    tool_index: HashMap<String, usize>,
    resources: Vec<ResourceEntry>,
    tool_count: Arc<AtomicUsize>,
}

impl McpServer {
    /// Create a server with no clients.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            boundary: ErrorBoundary::new(Arc::new(TracingReporter)),
            elicitor: PeerElicitor::new(),
            tools: Vec::new(),
            tool_index: HashMap::new(),
            resources: Vec::new(),
            tool_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report unexpected failures to `reporter` instead of the log.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.boundary = ErrorBoundary::new(reporter);
        self
    }

    /// Server metadata.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The elicitation channel handed to tools.
    pub fn elicitor(&self) -> Arc<dyn ElicitInput> {
        Arc::new(self.elicitor.clone())
    }

    /// Live count of registered tools.
    pub fn tool_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.tool_count)
    }

    /// Register every tool (and resource, if offered) of `client`.
    ///
    /// Registration is all-or-nothing per client: on error nothing from
    /// this client is kept.
    pub async fn add_client(&mut self, client: &dyn Client) -> Result<()> {
        let mut tool_registrar = FacadeToolRegistrar {
            prefix: client.prefix(),
            client_name: client.name(),
            taken: &self.tool_index,
            staged: Vec::new(),
            staged_names: HashSet::new(),
        };
        client
            .register_tools(&mut tool_registrar, self.elicitor())
            .await?;
        let staged_tools = tool_registrar.staged;

        let mut staged_resources = Vec::new();
        if let Some(provider) = client.resource_provider() {
            let mut resource_registrar = FacadeResourceRegistrar {
                prefix: client.prefix(),
                client_name: client.name(),
                taken: &self.resources,
                staged: Vec::new(),
            };
            provider.register_resources(&mut resource_registrar).await?;
            staged_resources = resource_registrar.staged;
        }

        let tool_count = staged_tools.len();
        let resource_count = staged_resources.len();
        for entry in staged_tools {
            self.tool_index
                .insert(entry.descriptor.name.to_string(), self.tools.len());
            self.tools.push(entry);
        }
        self.resources.extend(staged_resources);
        self.tool_count.store(self.tools.len(), Ordering::SeqCst);

        tracing::info!(
            client = client.name(),
            prefix = client.prefix(),
            tools = tool_count,
            resources = resource_count,
            "Registered client"
        );
        Ok(())
    }

    /// Number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if a tool with this global name exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tool_index.contains_key(name)
    }

    /// Protocol descriptors in registration order.
    pub fn tool_descriptors(&self) -> Vec<rmcp::model::Tool> {
        self.tools.iter().map(|e| e.descriptor.clone()).collect()
    }

    /// Summaries in registration order.
    pub fn tool_summaries(&self) -> Vec<ToolSummary> {
        self.tools
            .iter()
            .map(|e| ToolSummary {
                name: e.descriptor.name.to_string(),
                title: e.descriptor.title.clone().unwrap_or_default(),
                client: e.client.clone(),
                read_only: !e.tool.definition().is_mutating(),
            })
            .collect()
    }

    /// Registered resource URI templates in registration order.
    pub fn resource_uri_templates(&self) -> Vec<String> {
        self.resources
            .iter()
            .map(|e| e.template.as_str().to_string())
            .collect()
    }

    /// Invoke a tool by global name. Never fails; problems come back as
    /// error results.
    pub async fn call_tool_by_name(&self, name: &str, args: Option<JsonObject>) -> CallToolResult {
        let Some(&index) = self.tool_index.get(name) else {
            tracing::warn!(tool = name, "Call to unknown tool");
            return CallToolResult::error(vec![Content::text(format!("Unknown tool: {name}"))]);
        };
        let entry = &self.tools[index];
        tracing::debug!(tool = name, client = %entry.client, "Calling tool");
        let ctx = ToolContext::new(name, self.elicitor());
        self.boundary.invoke(entry.tool.as_ref(), args, ctx).await
    }

    /// Read a resource by URI.
    pub async fn read_resource_uri(
        &self,
        uri: &str,
    ) -> std::result::Result<ReadResourceResult, ErrorData> {
        let (entry, vars) = self
            .resources
            .iter()
            .find_map(|entry| entry.template.matches(uri).map(|vars| (entry, vars)))
            .ok_or_else(|| {
                ErrorData::resource_not_found(
                    format!("Resource not found: {uri}"),
                    Some(json!({"uri": uri})),
                )
            })?;

        tracing::debug!(uri, client = %entry.client, "Reading resource");
        let value = self
            .boundary
            .run(uri, entry.handler.read(uri, &vars))
            .await
            .map_err(|failure| match failure {
                Failure::Domain(message) => ErrorData::invalid_request(message, None),
                Failure::Unexpected(message) => ErrorData::internal_error(message, None),
            })?;

        let (text, default_mime) = match value {
            Value::String(text) => (text, "text/plain"),
            other => (other.to_string(), "application/json"),
        };
        let mime = entry
            .definition
            .mime_type
            .clone()
            .unwrap_or_else(|| default_mime.to_string());

        serde_json::from_value(json!({
            "contents": [{"uri": uri, "mimeType": mime, "text": text}]
        }))
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))
    }

    /// Protocol resource templates in registration order.
    pub fn resource_templates(&self) -> Vec<ResourceTemplate> {
        self.resources
            .iter()
            .filter_map(|entry| {
                let mut raw = json!({
                    "uriTemplate": entry.template.as_str(),
                    "name": entry.definition.name,
                });
                if let Some(title) = &entry.definition.title {
                    raw["title"] = json!(format!("{}: {title}", entry.client));
                }
                if let Some(description) = &entry.definition.description {
                    raw["description"] = json!(description);
                }
                if let Some(mime) = &entry.definition.mime_type {
                    raw["mimeType"] = json!(mime);
                }
                serde_json::from_value(raw)
                    .map_err(|e| tracing::warn!("Skipping resource template: {e}"))
                    .ok()
            })
            .collect()
    }

    /// Serve over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<()> {
        tracing::info!(
            name = %self.config.name,
            tools = self.tools.len(),
            resources = self.resources.len(),
            "Serving MCP over stdio"
        );
        let service = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        service
            .waiting()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("config", &self.config)
            .field("tools", &self.tools.len())
            .field("resources", &self.resources.len())
            .finish()
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let capabilities = if self.resources.is_empty() {
            ServerCapabilities::builder().enable_tools().build()
        } else {
            ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build()
        };

        let mut server_info = Implementation::from_build_env();
        server_info.name = self.config.name.clone();
        server_info.version = self.config.version.clone();

        let mut info = ServerInfo::default();
        info.capabilities = capabilities;
        info.server_info = server_info;
        info.instructions = self.config.instructions.clone();
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tool_descriptors()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        self.elicitor.set_peer(context.peer.clone());
        Ok(self.call_tool_by_name(&request.name, request.arguments).await)
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult::with_all_items(
            self.resource_templates(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<ReadResourceResult, ErrorData> {
        self.elicitor.set_peer(context.peer.clone());
        self.read_resource_uri(&request.uri).await
    }
}

// ============================================================================
// Registrars
// ============================================================================

fn annotations(def: &ToolDefinition) -> ToolAnnotations {
    let mut annotations = ToolAnnotations::default();
    annotations.title = Some(def.title.clone());
    annotations.read_only_hint = def.read_only;
    annotations.destructive_hint = def.destructive;
    annotations.idempotent_hint = def.idempotent;
    annotations.open_world_hint = def.open_world;
    annotations
}

struct FacadeToolRegistrar<'a> {
    prefix: &'a str,
    client_name: &'a str,
    taken: &'a HashMap<String, usize>,
    staged: Vec<ToolEntry>,
    staged_names: HashSet<String>,
}

impl ToolRegistrar for FacadeToolRegistrar<'_> {
    fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let def = tool.definition();
        def.validate()?;

        let name = global_tool_name(self.prefix, &tool.name());
        if self.taken.contains_key(&name) || self.staged_names.contains(&name) {
            return Err(Error::duplicate_tool(name));
        }

        let mut descriptor = rmcp::model::Tool::new(
            name.clone(),
            build_description(def),
            Arc::new(build_input_schema(def)),
        );
        descriptor.title = Some(global_tool_title(self.client_name, &def.title));
        descriptor.annotations = Some(annotations(def));

        tracing::debug!(tool = %name, "Registered tool");
        self.staged_names.insert(name);
        self.staged.push(ToolEntry {
            descriptor,
            tool,
            client: self.client_name.to_string(),
        });
        Ok(())
    }
}

struct FacadeResourceRegistrar<'a> {
    prefix: &'a str,
    client_name: &'a str,
    taken: &'a [ResourceEntry],
    staged: Vec<ResourceEntry>,
}

impl ResourceRegistrar for FacadeResourceRegistrar<'_> {
    fn register(
        &mut self,
        definition: ResourceDefinition,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<()> {
        let uri = resource_uri_template(self.prefix, &definition.name, &definition.path_template);
        let template = UriTemplate::parse(&uri)?;

        let collides = self
            .taken
            .iter()
            .chain(self.staged.iter())
            .any(|entry| entry.template.as_str() == uri);
        if collides {
            return Err(Error::duplicate_resource(uri));
        }

        tracing::debug!(uri = %uri, "Registered resource");
        self.staged.push(ResourceEntry {
            template,
            definition,
            client: self.client_name.to_string(),
            handler,
        });
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
