//! The server configuration file.
//!
//! Resolution order for the file path:
//!
//! 1. `--config <path>` or `TOOLBRIDGE_CONFIG`
//! 2. `<config dir>/toolbridge/config.toml` (e.g. `~/.config/toolbridge/config.toml`)
//!
//! An explicit path must exist. A missing default file means "run with
//! defaults": only the built-in health tool is served.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use toolbridge_core::{Error, Result};
use toolbridge_mcp::{DiscoveryConfig, ServerConfig};
use toolbridge_mcp_rest::RestClientConfig;

/// Name used for the config directory and in messages.
pub const PROJECT_NAME: &str = "toolbridge";

/// Prefix taken by the built-in health client.
pub const RESERVED_PREFIX: &str = "server";

/// Written by `toolbridge config init`.
pub const STARTER_CONFIG: &str = r#"# Toolbridge configuration

[server]
name = "toolbridge"
# instructions = "Tools for our SaaS backends."

[logging]
# Overridden by RUST_LOG.
level = "info"
json = false

[discovery]
include_read_only = true
include_mutating = true
# Global or local tool names, or titles.
exclude = []

# One [[clients]] table per backend. Secrets are read from the named
# environment variables; a client whose variable is unset is skipped.
#
# [[clients]]
# prefix = "tracker"
# name = "Tracker"
# base_url = "https://tracker.example.com/api"
# auth = { type = "bearer", token_env = "TRACKER_TOKEN" }
# defaults = { project = "core" }
# cache_ttl_secs = 60
#
# [[clients.tools]]
# title = "List Issues"
# summary = "List open issues in a project."
# path = "/projects/{project}/issues"
# params = [
#     { name = "project", description = "Project key" },
#     { name = "limit", type = "integer", required = false, default = 20 },
# ]
#
# [[clients.resources]]
# name = "issue"
# path = "{id}"
# endpoint = "/issues/{id}"
"#;

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `[server]`
    pub server: ServerSection,
    /// `[logging]`
    pub logging: LoggingSection,
    /// `[discovery]`
    pub discovery: DiscoverySection,
    /// `[[clients]]`
    pub clients: Vec<RestClientConfig>,
}

/// `[server]`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Name reported to MCP clients.
    pub name: String,
    /// Instructions for the connected agent.
    pub instructions: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: PROJECT_NAME.to_string(),
            instructions: None,
        }
    }
}

/// `[logging]`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// `[discovery]`, applied to every client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySection {
    /// Register read-only tools.
    pub include_read_only: bool,
    /// Register tools that change state.
    pub include_mutating: bool,
    /// Tools to leave out.
    pub exclude: Vec<String>,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            include_read_only: true,
            include_mutating: true,
            exclude: Vec::new(),
        }
    }
}

/// `<config dir>/toolbridge/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
}

/// The explicit path if given, else the default path.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    explicit.map(PathBuf::from).or_else(default_config_path)
}

impl Config {
    /// Load from the resolved path.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(Path::new(path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No configuration file; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            clients = config.clients.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Reject configurations that cannot be served: empty or duplicate
    /// prefixes, or a client claiming the health client's prefix.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for client in &self.clients {
            if client.prefix.trim().is_empty() {
                return Err(Error::config(format!(
                    "client '{}' has an empty prefix",
                    client.name
                )));
            }
            if client.prefix == RESERVED_PREFIX {
                return Err(Error::config(format!(
                    "client prefix '{RESERVED_PREFIX}' is reserved"
                )));
            }
            if !seen.insert(client.prefix.as_str()) {
                return Err(Error::config(format!(
                    "client prefix '{}' is used more than once",
                    client.prefix
                )));
            }
        }
        Ok(())
    }

    /// Server metadata for the MCP handshake.
    pub fn server_config(&self) -> ServerConfig {
        let config = ServerConfig::new(&self.server.name);
        match &self.server.instructions {
            Some(instructions) => config.with_instructions(instructions),
            None => config,
        }
    }

    /// Discovery settings applied to every client.
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            include_read_only: self.discovery.include_read_only,
            include_mutating: self.discovery.include_mutating,
            exclude_tools: self.discovery.exclude.clone(),
            ..DiscoveryConfig::default()
        }
    }
}
