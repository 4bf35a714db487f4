//! The contract between backend clients and the server.
//!
//! A backend client (one per SaaS product) registers its tools through a
//! [`ToolRegistrar`] the server hands it. If it also exposes addressable
//! resources it returns a [`ResourceProvider`] from
//! [`Client::resource_provider`]; clients without resources keep the
//! default `None`.

use crate::elicit::ElicitInput;
use crate::error::Result;
use crate::resources::{ResourceDefinition, ResourceHandler};
use crate::tool::Tool;
use async_trait::async_trait;
use std::sync::Arc;

/// Receives a client's tools.
pub trait ToolRegistrar: Send {
    /// Register one tool. Fails on a duplicate or malformed tool.
    fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()>;
}

/// Receives a client's resources.
pub trait ResourceRegistrar: Send {
    /// Register one resource. Fails on a duplicate or unparsable template.
    fn register(
        &mut self,
        definition: ResourceDefinition,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<()>;
}

/// Optional resource capability of a [`Client`].
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Register every resource this client exposes.
    async fn register_resources(&self, registrar: &mut dyn ResourceRegistrar) -> Result<()>;
}

/// A backend client.
#[async_trait]
pub trait Client: Send + Sync {
    /// Display name, used in tool titles (`<name>: <title>`).
    fn name(&self) -> &str;

    /// Unique prefix, used in tool names and resource URIs.
    fn prefix(&self) -> &str;

    /// Register every tool this client exposes.
    ///
    /// `elicitor` is the server's elicitation channel, for clients that
    /// want to hold on to it outside of individual invocations.
    async fn register_tools(
        &self,
        registrar: &mut dyn ToolRegistrar,
        elicitor: Arc<dyn ElicitInput>,
    ) -> Result<()>;

    /// The resource capability, if this client has one.
    fn resource_provider(&self) -> Option<&dyn ResourceProvider> {
        None
    }
}
