//! Declarative configuration of a REST backend.
//!
//! One [`RestClientConfig`] describes a whole backend: where it lives, how
//! it authenticates, and the tools and resources it exposes. The structures
//! deserialize from the `[[clients]]` tables of the server configuration
//! file.
//!
//! ```toml
//! [[clients]]
//! prefix = "tracker"
//! name = "Tracker"
//! base_url = "https://tracker.example.com/api"
//! auth = { type = "bearer", token_env = "TRACKER_TOKEN" }
//! defaults = { project = "core" }
//!
//! [[clients.tools]]
//! title = "List Issues"
//! summary = "List open issues in a project."
//! path = "/projects/{project}/issues"
//! params = [
//!     { name = "project", type = "string", description = "Project key" },
//!     { name = "limit", type = "integer", location = "query", required = false },
//! ]
//! ```

use crate::api::HttpMethod;
use crate::auth::Auth;
use crate::error::{RestError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A whole REST backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestClientConfig {
    /// Unique prefix for tool names and resource URIs.
    pub prefix: String,
    /// Display name used in titles and error messages.
    pub name: String,
    /// Base URL every endpoint is resolved against.
    pub base_url: String,
    /// Credentials.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Client-level parameter defaults (e.g. a default project).
    #[serde(default)]
    pub defaults: BTreeMap<String, Value>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// TTL for cached GET responses; `0` disables the cache.
    #[serde(default)]
    pub cache_ttl_secs: u64,
    /// Configured tools.
    #[serde(default)]
    pub tools: Vec<RestToolConfig>,
    /// Configured resources.
    #[serde(default)]
    pub resources: Vec<RestResourceConfig>,
}

/// Where credentials come from. Secrets are never written in the file;
/// each variant names the environment variable holding them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum AuthConfig {
    /// No credentials.
    #[default]
    None,
    /// `Authorization: Bearer $token_env`
    Bearer {
        /// Variable holding the token
        token_env: String,
    },
    /// `Authorization: token $token_env`
    Token {
        /// Variable holding the token
        token_env: String,
    },
    /// `Authorization: Basic base64(username:$password_env)`
    Basic {
        /// User name
        username: String,
        /// Variable holding the password
        password_env: String,
    },
    /// `<header>: $value_env`
    ApiKey {
        /// Header name
        header: String,
        /// Variable holding the key
        value_env: String,
    },
}

impl AuthConfig {
    /// The environment variable this credential needs, if any.
    pub fn env_var(&self) -> Option<&str> {
        match self {
            AuthConfig::None => None,
            AuthConfig::Bearer { token_env } | AuthConfig::Token { token_env } => Some(token_env),
            AuthConfig::Basic { password_env, .. } => Some(password_env),
            AuthConfig::ApiKey { value_env, .. } => Some(value_env),
        }
    }

    /// Resolve against the process environment.
    pub fn resolve(&self, client: &str) -> Result<Auth> {
        self.resolve_with(client, |var| std::env::var(var).ok())
    }

    /// Resolve with an explicit variable lookup. Empty values count as
    /// unset.
    pub fn resolve_with<F>(&self, client: &str, lookup: F) -> Result<Auth>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |var: &str| {
            lookup(var)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| RestError::MissingCredential {
                    client: client.to_string(),
                    var: var.to_string(),
                })
        };

        Ok(match self {
            AuthConfig::None => Auth::None,
            AuthConfig::Bearer { token_env } => Auth::bearer(secret(token_env)?),
            AuthConfig::Token { token_env } => Auth::token(secret(token_env)?),
            AuthConfig::Basic {
                username,
                password_env,
            } => Auth::basic(username, secret(password_env)?),
            AuthConfig::ApiKey { header, value_env } => Auth::api_key(header, secret(value_env)?),
        })
    }
}

/// One REST-backed tool.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestToolConfig {
    /// Tool title.
    pub title: String,
    /// One-paragraph summary.
    pub summary: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Endpoint path with `{param}` placeholders.
    pub path: String,
    /// Declared parameters.
    #[serde(default)]
    pub params: Vec<RestParamConfig>,
    /// JSON pointer into the response; the selected value is returned.
    #[serde(default)]
    pub select: Option<String>,
    /// Longer statement of intent.
    #[serde(default)]
    pub purpose: Option<String>,
    /// When to use the tool.
    #[serde(default)]
    pub use_cases: Vec<String>,
    /// Usage hints.
    #[serde(default)]
    pub hints: Vec<String>,
    /// Output shape.
    #[serde(default)]
    pub output_format: Option<String>,
    /// Example invocations.
    #[serde(default)]
    pub examples: Vec<RestExampleConfig>,
    /// Overrides the method-derived read-only hint.
    #[serde(default)]
    pub read_only: Option<bool>,
    /// Overrides the method-derived destructive hint.
    #[serde(default)]
    pub destructive: Option<bool>,
    /// Overrides the method-derived idempotent hint.
    #[serde(default)]
    pub idempotent: Option<bool>,
    /// Open-world hint.
    #[serde(default)]
    pub open_world: Option<bool>,
}

/// Where a parameter goes in the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Substituted into the path template.
    Path,
    /// Appended as a query pair.
    Query,
    /// A field of the JSON body.
    Body,
}

/// Accepted JSON type of a configured parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// String
    #[default]
    String,
    /// Integer
    Integer,
    /// Number
    Number,
    /// Boolean
    Boolean,
    /// Array of anything
    Array,
    /// Object
    Object,
    /// Anything
    Any,
}

/// One configured parameter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestParamConfig {
    /// Argument name.
    pub name: String,
    /// JSON type.
    #[serde(rename = "type", default)]
    pub kind: ParamKind,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Whether the caller must supply it. Path parameters always must,
    /// unless the client configures a default for them.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Request location. Defaults to `path` if the name appears in the path
    /// template, `query` for GET and DELETE, `body` otherwise.
    #[serde(default)]
    pub location: Option<ParamLocation>,
    /// Schema-level default.
    #[serde(default)]
    pub default: Option<Value>,
    /// Allowed string values.
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    /// Example values.
    #[serde(default)]
    pub examples: Vec<String>,
}

fn default_required() -> bool {
    true
}

/// A documented example.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestExampleConfig {
    /// What it demonstrates.
    pub description: String,
    /// Example arguments.
    pub arguments: Value,
    /// Expected output.
    #[serde(default)]
    pub expected_output: Option<String>,
}

/// One REST-backed resource.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestResourceConfig {
    /// Resource name; the URI is `<prefix>://<name>/<path>`.
    pub name: String,
    /// URI path template, e.g. `{project}/{id}`.
    pub path: String,
    /// Endpoint template, filled from the same variables.
    pub endpoint: String,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// MIME type of the returned content.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// JSON pointer into the response.
    #[serde(default)]
    pub select: Option<String>,
}
