//! The error boundary around every tool invocation.
//!
//! Whatever a tool does (returns, fails, panics), the caller gets exactly
//! one text content item back. Validation failures and domain errors are
//! shown as-is; unexpected errors and panics get a generic message and
//! are reported to the [`ErrorReporter`] once.

use crate::definition::JsonObject;
use crate::error::ToolError;
use crate::telemetry::{ErrorReport, ErrorReporter, TracingReporter};
use crate::tool::{Tool, ToolContext};
use crate::validate::validate_arguments;
use futures::FutureExt;
use rmcp::model::{CallToolResult, Content};
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// A failed invocation, already turned into caller-facing text.
#[derive(Clone, Debug, PartialEq)]
pub enum Failure {
    /// Declared domain error; message is the tool's own.
    Domain(String),
    /// Unexpected error or panic; message is generic.
    Unexpected(String),
}

impl Failure {
    /// Caller-facing message.
    pub fn message(&self) -> &str {
        match self {
            Failure::Domain(message) | Failure::Unexpected(message) => message,
        }
    }
}

/// Runs tools and resource handlers so that nothing escapes.
#[derive(Clone)]
pub struct ErrorBoundary {
    reporter: Arc<dyn ErrorReporter>,
}

impl Default for ErrorBoundary {
    fn default() -> Self {
        Self::new(Arc::new(TracingReporter))
    }
}

impl ErrorBoundary {
    /// Create a boundary reporting to `reporter`.
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { reporter }
    }

    /// Validate `args`, run `tool`, and convert the outcome into a
    /// protocol result.
    pub async fn invoke(
        &self,
        tool: &dyn Tool,
        args: Option<JsonObject>,
        ctx: ToolContext,
    ) -> CallToolResult {
        let name = ctx.tool_name.clone();
        let args = args.unwrap_or_default();

        let args = match validate_arguments(tool.definition(), &args) {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!(tool = %name, error = %e, "Rejected tool arguments");
                return CallToolResult::error(vec![Content::text(format!(
                    "Invalid arguments for tool '{name}': {e}"
                ))]);
            }
        };

        match self.run(&name, tool.execute(args, ctx)).await {
            Ok(value) => match serde_json::to_string(&value) {
                Ok(text) => CallToolResult::success(vec![Content::text(text)]),
                Err(e) => {
                    let failure = self.unexpected(&name, anyhow::Error::new(e));
                    CallToolResult::error(vec![Content::text(failure.message())])
                }
            },
            Err(failure) => CallToolResult::error(vec![Content::text(failure.message())]),
        }
    }

    /// Drive `fut` to completion, catching panics and classifying errors.
    ///
    /// `label` names the tool or resource in telemetry.
    pub async fn run<F>(&self, label: &str, fut: F) -> Result<Value, Failure>
    where
        F: Future<Output = Result<Value, ToolError>> + Send,
    {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(ToolError::Domain { message })) => {
                tracing::debug!(tool = %label, "Tool returned domain error: {message}");
                Err(Failure::Domain(message))
            }
            Ok(Err(ToolError::Unexpected(err))) => Err(self.unexpected(label, err)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.reporter
                    .notify(&ErrorReport::from_panic(label, message.clone()));
                Err(Failure::Unexpected(format!(
                    "Tool execution failed with unknown error: {message}"
                )))
            }
        }
    }

    fn unexpected(&self, label: &str, err: anyhow::Error) -> Failure {
        self.reporter.notify(&ErrorReport::from_error(label, &err));
        Failure::Unexpected(format!("Tool execution failed: {err}"))
    }
}

impl std::fmt::Debug for ErrorBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorBoundary").finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
