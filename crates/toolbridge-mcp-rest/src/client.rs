//! A backend client assembled from a [`RestClientConfig`].

use crate::api::ApiClient;
use crate::auth::Auth;
use crate::config::RestClientConfig;
use crate::error::Result;
use crate::tool::{ClientContext, RestResource, RestTool};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use toolbridge_mcp::{
    Client, DiscoveryConfig, ElicitInput, ResourceDefinition, ResourceProvider,
    ResourceRegistrar, Tool, ToolDiscovery, ToolRegistrar, ToolRegistry,
};

/// Discovery over the tools compiled from configuration.
struct ConfiguredTools {
    prefix: String,
    tools: Vec<Arc<dyn Tool>>,
}

#[async_trait]
impl ToolDiscovery for ConfiguredTools {
    async fn discover(
        &self,
        config: Option<&DiscoveryConfig>,
    ) -> toolbridge_mcp::Result<Vec<Arc<dyn Tool>>> {
        let tools = self.tools.clone();
        Ok(match config {
            Some(config) => config.filter(tools, Some(&self.prefix)),
            None => tools,
        })
    }
}

/// A REST backend exposed as tools and resources.
pub struct RestClient {
    prefix: String,
    name: String,
    context: Arc<ClientContext>,
    registry: Mutex<ToolRegistry>,
    discovery: DiscoveryConfig,
    resources: Vec<(ResourceDefinition, Arc<RestResource>)>,
}

impl RestClient {
    /// Build a client, resolving credentials from the environment.
    pub fn from_config(config: &RestClientConfig) -> Result<Self> {
        let auth = config.auth.resolve(&config.prefix)?;
        Self::new(config, auth)
    }

    /// Build a client with explicit credentials.
    ///
    /// Every tool and resource is compiled here; a malformed declaration
    /// fails construction.
    pub fn new(config: &RestClientConfig, auth: Auth) -> Result<Self> {
        let mut api = ApiClient::new(&config.base_url, auth)?
            .with_cache_ttl(Duration::from_secs(config.cache_ttl_secs));
        for (name, value) in &config.headers {
            api = api.with_header(name, value)?;
        }

        let context = Arc::new(ClientContext {
            name: config.name.clone(),
            api,
            defaults: config.defaults.clone(),
        });

        let tools = config
            .tools
            .iter()
            .map(|tool| {
                RestTool::from_config(tool, Arc::clone(&context))
                    .map(|tool| Arc::new(tool) as Arc<dyn Tool>)
            })
            .collect::<Result<Vec<_>>>()?;

        let resources = config
            .resources
            .iter()
            .map(|resource| {
                RestResource::from_config(resource, Arc::clone(&context))
                    .map(|(definition, handler)| (definition, Arc::new(handler)))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            client = %config.prefix,
            tools = tools.len(),
            resources = resources.len(),
            auth = context.api.auth().scheme(),
            "Built REST client"
        );

        let discovery = ConfiguredTools {
            prefix: config.prefix.clone(),
            tools,
        };
        Ok(Self {
            prefix: config.prefix.clone(),
            name: config.name.clone(),
            context,
            registry: Mutex::new(ToolRegistry::new(Arc::new(discovery))),
            discovery: DiscoveryConfig::default(),
            resources,
        })
    }

    /// Shape which of the configured tools are registered.
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// The HTTP client.
    pub fn api(&self) -> &ApiClient {
        &self.context.api
    }

    /// Local names of the tools registered by the last registration pass.
    pub async fn registered_tool_names(&self) -> Vec<String> {
        self.registry.lock().await.tool_names().to_vec()
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("prefix", &self.prefix)
            .field("name", &self.name)
            .field("api", &self.context.api)
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Client for RestClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn register_tools(
        &self,
        registrar: &mut dyn ToolRegistrar,
        _elicitor: Arc<dyn ElicitInput>,
    ) -> toolbridge_mcp::Result<()> {
        self.registry
            .lock()
            .await
            .register_all_tools(registrar, Some(&self.discovery))
            .await?;
        Ok(())
    }

    fn resource_provider(&self) -> Option<&dyn ResourceProvider> {
        (!self.resources.is_empty()).then_some(self as &dyn ResourceProvider)
    }
}

#[async_trait]
impl ResourceProvider for RestClient {
    async fn register_resources(
        &self,
        registrar: &mut dyn ResourceRegistrar,
    ) -> toolbridge_mcp::Result<()> {
        for (definition, handler) in &self.resources {
            registrar.register(definition.clone(), handler.clone())?;
        }
        Ok(())
    }
}
