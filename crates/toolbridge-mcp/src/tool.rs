//! The executable side of a tool.
//!
//! A [`Tool`] pairs a [`ToolDefinition`] with business logic. Tools never
//! validate their own arguments: by the time `execute` runs, the server has
//! checked them against the definition and filled in defaults.

use crate::definition::{JsonObject, ToolDefinition};
use crate::elicit::{DisconnectedElicitor, ElicitError, ElicitInput, ElicitOptions, ElicitRequest, ElicitResponse};
use crate::error::ToolError;
use crate::naming::slugify;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Per-invocation context handed to every tool.
#[derive(Clone)]
pub struct ToolContext {
    /// Global name the tool was invoked under
    pub tool_name: String,
    /// Channel for asking the user for more input
    pub elicitor: Arc<dyn ElicitInput>,
}

impl ToolContext {
    /// Create a context.
    pub fn new(tool_name: impl Into<String>, elicitor: Arc<dyn ElicitInput>) -> Self {
        Self {
            tool_name: tool_name.into(),
            elicitor,
        }
    }

    /// A context with no client to elicit from.
    pub fn detached(tool_name: impl Into<String>) -> Self {
        Self::new(tool_name, Arc::new(DisconnectedElicitor))
    }

    /// Shorthand for `self.elicitor.elicit(..)`.
    pub async fn elicit(
        &self,
        request: ElicitRequest,
        options: ElicitOptions,
    ) -> Result<ElicitResponse, ElicitError> {
        self.elicitor.elicit(request, options).await
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("tool_name", &self.tool_name)
            .finish_non_exhaustive()
    }
}

/// A tool a backend client exposes.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's definition.
    fn definition(&self) -> &ToolDefinition;

    /// Client-local name. Defaults to the slugified title.
    fn name(&self) -> String {
        slugify(&self.definition().title)
    }

    /// Run the tool with validated arguments.
    async fn execute(&self, args: JsonObject, ctx: ToolContext) -> Result<Value, ToolError>;
}

/// A [`Tool`] backed by an async closure.
///
/// ```rust
/// use serde_json::json;
/// use toolbridge_mcp::{FnTool, ToolDefinition};
///
/// let tool = FnTool::new(ToolDefinition::new("Echo", "Echo arguments"), |args, _ctx| async move {
///     Ok(serde_json::Value::Object(args))
/// });
/// # let _ = tool;
/// ```
pub struct FnTool<F> {
    definition: ToolDefinition,
    handler: F,
}

impl<F, Fut> FnTool<F>
where
    F: Fn(JsonObject, ToolContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    /// Wrap `handler` as a tool described by `definition`.
    pub fn new(definition: ToolDefinition, handler: F) -> Self {
        Self {
            definition,
            handler,
        }
    }

    /// Wrap and box as a shared trait object.
    pub fn shared(definition: ToolDefinition, handler: F) -> Arc<dyn Tool> {
        Arc::new(Self::new(definition, handler))
    }
}

#[async_trait]
impl<F, Fut> Tool for FnTool<F>
where
    F: Fn(JsonObject, ToolContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: JsonObject, ctx: ToolContext) -> Result<Value, ToolError> {
        (self.handler)(args, ctx).await
    }
}
