//! Tool registration and dispatch layer for Toolbridge.
//!
//! This crate turns declarative tool definitions from many backend clients
//! into one namespaced MCP tool set, and runs every invocation behind a
//! single error boundary.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      toolbridge-mcp                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ToolDefinition / ParamType: declarative tool description   │
//! │  schema, description: inputSchema + description rendering   │
//! │  validate: argument checking with defaults                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Tool / FnTool: executable tools, ToolContext per call      │
//! │  Client: backend contract (+ optional ResourceProvider)     │
//! │  ToolRegistry: per-client discovery cache and registration  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  McpServer: facade (implements ServerHandler)               │
//! │  ErrorBoundary: validation, panics, telemetry               │
//! │  PeerElicitor: elicitation back to the connected client     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Built-in clients:                                          │
//! │  └── health: server status and tool count                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use toolbridge_mcp::{HealthClient, McpServer, ServerConfig};
//!
//! let mut server = McpServer::new(ServerConfig::new("toolbridge"));
//! let health = HealthClient::for_server(&server);
//! server.add_client(&health).await?;
//! server.add_client(&my_backend).await?;
//!
//! server.serve_stdio().await?;
//! ```

pub mod client;
pub mod definition;
pub mod description;
pub mod dispatch;
pub mod elicit;
pub mod error;
pub mod naming;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod server;
pub mod telemetry;
pub mod tool;
pub mod tools;
pub mod validate;

// Re-exports: definitions
pub use definition::{
    JsonObject, NumberRules, ObjectSchema, ParamType, ParameterDefinition, StringFormat,
    StringRules, ToolDefinition, ToolExample,
};

// Re-exports: tools and clients
pub use client::{Client, ResourceProvider, ResourceRegistrar, ToolRegistrar};
pub use tool::{FnTool, Tool, ToolContext};

// Re-exports: registry
pub use registry::{DiscoveryConfig, RegistryState, ToolDiscovery, ToolRegistry};

// Re-exports: resources
pub use resources::{ResourceDefinition, ResourceHandler, UriTemplate, UriVariables};

// Re-exports: elicitation
pub use elicit::{
    ElicitAction, ElicitError, ElicitInput, ElicitOptions, ElicitRequest, ElicitResponse,
    PeerElicitor,
};

// Re-exports: server
pub use dispatch::ErrorBoundary;
pub use server::{McpServer, ServerConfig, ToolSummary};

// Re-exports: telemetry
pub use telemetry::{CollectingReporter, ErrorReport, ErrorReporter, TracingReporter};

// Re-exports: error
pub use error::{Error, Result, ToolError};

// Re-exports: built-in tools
pub use tools::{HealthClient, HealthResponse};
