//! REST backend clients for Toolbridge.
//!
//! Most SaaS integrations are the same shape: validate arguments, call one
//! REST endpoint, hand back (part of) the JSON response. This crate
//! expresses that shape as configuration instead of code.
//!
//! - [`ApiClient`]: one backend's HTTP client (auth header, 401 refresh
//!   and retry, response decoding, GET cache)
//! - [`RestClientConfig`]: declarative tools and resources
//! - [`RestClient`]: implements [`toolbridge_mcp::Client`] over a config
//!
//! # Example
//!
//! ```rust,ignore
//! use toolbridge_mcp::{McpServer, ServerConfig};
//! use toolbridge_mcp_rest::{RestClient, RestClientConfig};
//!
//! let config: RestClientConfig = toml::from_str(TRACKER_TOML)?;
//! let tracker = RestClient::from_config(&config)?;
//!
//! let mut server = McpServer::new(ServerConfig::new("toolbridge"));
//! server.add_client(&tracker).await?;
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod tool;

pub use api::{ApiClient, HttpMethod, USER_AGENT};
pub use auth::{Auth, StaticToken, TokenSource};
pub use client::RestClient;
pub use config::{
    AuthConfig, ParamKind, ParamLocation, RestClientConfig, RestExampleConfig, RestParamConfig,
    RestResourceConfig, RestToolConfig,
};
pub use error::{RestError, Result};
pub use tool::{ClientContext, RestResource, RestTool};
