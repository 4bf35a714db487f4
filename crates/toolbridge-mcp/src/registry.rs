//! Per-client tool registry with discovery caching.
//!
//! Each backend client owns a [`ToolRegistry`]. Discovery (working out
//! which tools the client currently exposes) is delegated to a
//! [`ToolDiscovery`] and cached against the [`DiscoveryConfig`] it ran
//! with, so re-registering with an unchanged configuration does not
//! recompute anything.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = ToolRegistry::new(Arc::new(MyDiscovery::new(&settings)));
//!
//! // Discover and hand every tool to the server's registrar
//! let count = registry.register_all_tools(registrar, Some(&config)).await?;
//! ```

use crate::client::ToolRegistrar;
use crate::error::{Error, Result};
use crate::tool::Tool;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Computes the tools a client currently exposes.
#[async_trait]
pub trait ToolDiscovery: Send + Sync {
    /// Discover tools, honouring `config` when given.
    async fn discover(&self, config: Option<&DiscoveryConfig>) -> Result<Vec<Arc<dyn Tool>>>;
}

// ============================================================================
// DiscoveryConfig
// ============================================================================

/// Knobs that shape discovery.
#[derive(Clone)]
pub struct DiscoveryConfig {
    /// Keep tools marked read-only.
    pub include_read_only: bool,
    /// Keep tools not marked read-only.
    pub include_mutating: bool,
    /// Tool names or titles to drop.
    pub exclude_tools: Vec<String>,
    /// Extra tools appended after filtering.
    pub custom_tools: Vec<Arc<dyn Tool>>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include_read_only: true,
            include_mutating: true,
            exclude_tools: Vec::new(),
            custom_tools: Vec::new(),
        }
    }
}

impl DiscoveryConfig {
    /// Only read-only tools.
    pub fn read_only() -> Self {
        Self {
            include_mutating: false,
            ..Self::default()
        }
    }

    /// Add a tool name or title to the exclude list.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude_tools.push(name.into());
        self
    }

    /// Append a custom tool.
    pub fn with_custom_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.custom_tools.push(tool);
        self
    }

    /// Cache-key equality: flags equal, exclude lists equal as sorted
    /// sets, custom tool lists equal in length.
    ///
    /// Custom tools are compared by count only, so swapping one custom
    /// tool for another does not trigger rediscovery.
    pub fn matches(&self, other: &DiscoveryConfig) -> bool {
        fn sorted(names: &[String]) -> Vec<&str> {
            let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
            names.sort_unstable();
            names.dedup();
            names
        }

        self.include_read_only == other.include_read_only
            && self.include_mutating == other.include_mutating
            && sorted(&self.exclude_tools) == sorted(&other.exclude_tools)
            && self.custom_tools.len() == other.custom_tools.len()
    }

    /// Returns `true` if `tool` is on the exclude list, by local name,
    /// title, or `<prefix>_<name>` when `prefix` is given.
    pub fn is_excluded(&self, tool: &dyn Tool, prefix: Option<&str>) -> bool {
        let local = tool.name();
        let global = prefix.map(|p| crate::naming::global_tool_name(p, &local));
        self.exclude_tools.iter().any(|excluded| {
            *excluded == local
                || *excluded == tool.definition().title
                || global.as_deref() == Some(excluded.as_str())
        })
    }

    /// Apply the configuration to candidate tools.
    pub fn filter(
        &self,
        candidates: Vec<Arc<dyn Tool>>,
        prefix: Option<&str>,
    ) -> Vec<Arc<dyn Tool>> {
        let mut out: Vec<Arc<dyn Tool>> = candidates
            .into_iter()
            .filter(|tool| {
                let mutating = tool.definition().is_mutating();
                let kind_allowed = if mutating {
                    self.include_mutating
                } else {
                    self.include_read_only
                };
                kind_allowed && !self.is_excluded(tool.as_ref(), prefix)
            })
            .collect();
        out.extend(self.custom_tools.iter().cloned());
        out
    }
}

impl fmt::Debug for DiscoveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let custom: Vec<String> = self.custom_tools.iter().map(|t| t.name()).collect();
        f.debug_struct("DiscoveryConfig")
            .field("include_read_only", &self.include_read_only)
            .field("include_mutating", &self.include_mutating)
            .field("exclude_tools", &self.exclude_tools)
            .field("custom_tools", &custom)
            .finish()
    }
}

fn same_config(a: Option<&DiscoveryConfig>, b: Option<&DiscoveryConfig>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.matches(b),
        _ => false,
    }
}

// ============================================================================
// ToolRegistry
// ============================================================================

/// Lifecycle of a [`ToolRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryState {
    /// Nothing discovered or registered.
    Empty,
    /// A discovery result is cached.
    Discovered,
    /// Tools are registered.
    Registered,
}

struct CachedDiscovery {
    config: Option<DiscoveryConfig>,
    tools: Arc<Vec<Arc<dyn Tool>>>,
}

/// Tools of one backend client.
///
/// Mutating operations take `&mut self`; owners that share a registry
/// wrap it in a `tokio::sync::Mutex`.
pub struct ToolRegistry {
    discovery: Arc<dyn ToolDiscovery>,
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
    cache: Option<CachedDiscovery>,
}

impl ToolRegistry {
    /// Create an empty registry using `discovery`.
    pub fn new(discovery: Arc<dyn ToolDiscovery>) -> Self {
        Self {
            discovery,
            tools: HashMap::new(),
            order: Vec::new(),
            cache: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RegistryState {
        if !self.tools.is_empty() {
            RegistryState::Registered
        } else if self.cache.is_some() {
            RegistryState::Discovered
        } else {
            RegistryState::Empty
        }
    }

    /// Register one tool under its local name.
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name();
        if self.tools.contains_key(&name) {
            return Err(Error::duplicate_tool(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a registered tool by local name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered local names in registration order.
    pub fn tool_names(&self) -> &[String] {
        &self.order
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Discover tools, reusing the cached result when `config` matches the
    /// configuration of the previous discovery.
    pub async fn discover_tools(
        &mut self,
        config: Option<&DiscoveryConfig>,
    ) -> Result<Arc<Vec<Arc<dyn Tool>>>> {
        if let Some(cached) = &self.cache
            && same_config(cached.config.as_ref(), config)
        {
            tracing::debug!(count = cached.tools.len(), "Tool discovery cache hit");
            return Ok(Arc::clone(&cached.tools));
        }

        tracing::debug!("Tool discovery cache miss; discovering");
        let tools = Arc::new(self.discovery.discover(config).await?);
        self.cache = Some(CachedDiscovery {
            config: config.cloned(),
            tools: Arc::clone(&tools),
        });
        Ok(tools)
    }

    /// Clear registrations, discover, then register each tool here and
    /// with `registrar`. Returns how many tools were registered.
    ///
    /// The first failure aborts the pass and leaves this registry with no
    /// registrations, matching the facade, which drops the whole client.
    pub async fn register_all_tools(
        &mut self,
        registrar: &mut dyn ToolRegistrar,
        config: Option<&DiscoveryConfig>,
    ) -> Result<usize> {
        self.tools.clear();
        self.order.clear();

        let tools = self.discover_tools(config).await?;
        for tool in tools.iter() {
            let registered = self
                .register_tool(Arc::clone(tool))
                .and_then(|()| registrar.register(Arc::clone(tool)));
            if let Err(e) = registered {
                self.tools.clear();
                self.order.clear();
                return Err(e);
            }
        }

        tracing::info!(count = tools.len(), "Registered tools");
        Ok(tools.len())
    }

    /// Drop all registrations and the discovery cache.
    pub fn clear(&mut self) {
        self.tools.clear();
        self.order.clear();
        self.cache = None;
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("state", &self.state())
            .field("tools", &self.order)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
