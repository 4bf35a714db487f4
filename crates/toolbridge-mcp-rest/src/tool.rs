//! Tools and resources compiled from configuration.
//!
//! A [`RestTool`] is built once per configured tool when its client is
//! constructed. Building resolves every parameter's location, derives the
//! annotation hints from the HTTP method, and validates the resulting
//! [`ToolDefinition`], so a bad declaration fails at startup rather than
//! on first call.

use crate::api::{ApiClient, HttpMethod};
use crate::config::{ParamKind, ParamLocation, RestParamConfig, RestResourceConfig, RestToolConfig};
use crate::error::{RestError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use toolbridge_mcp::{
    JsonObject, ObjectSchema, ParamType, ParameterDefinition, ResourceDefinition,
    ResourceHandler, Tool, ToolContext, ToolDefinition, ToolError, ToolExample, UriTemplate,
    UriVariables,
};

/// State shared by every tool and resource of one client.
#[derive(Debug)]
pub struct ClientContext {
    /// Display name, used in domain error messages.
    pub name: String,
    /// HTTP client.
    pub api: ApiClient,
    /// Client-level parameter defaults.
    pub defaults: BTreeMap<String, Value>,
}

#[derive(Debug)]
struct BoundParam {
    name: String,
    location: ParamLocation,
}

/// A tool that performs one REST call.
#[derive(Debug)]
pub struct RestTool {
    definition: ToolDefinition,
    method: HttpMethod,
    path: UriTemplate,
    params: Vec<BoundParam>,
    select: Option<String>,
    client: Arc<ClientContext>,
}

impl RestTool {
    /// Compile a configured tool.
    pub fn from_config(config: &RestToolConfig, client: Arc<ClientContext>) -> Result<Self> {
        let path = UriTemplate::parse(&config.path)?;
        let path_vars = path.variables();

        let mut definition = ToolDefinition::new(&config.title, &config.summary)
            .read_only(config.read_only.unwrap_or(config.method == HttpMethod::Get))
            .idempotent(config.idempotent.unwrap_or(matches!(
                config.method,
                HttpMethod::Get | HttpMethod::Put | HttpMethod::Delete
            )))
            .destructive(
                config
                    .destructive
                    .unwrap_or(config.method == HttpMethod::Delete),
            );
        if let Some(open_world) = config.open_world {
            definition = definition.open_world(open_world);
        }
        if let Some(purpose) = &config.purpose {
            definition = definition.with_purpose(purpose);
        }
        if let Some(output_format) = &config.output_format {
            definition = definition.with_output_format(output_format);
        }
        for use_case in &config.use_cases {
            definition = definition.with_use_case(use_case);
        }
        for hint in &config.hints {
            definition = definition.with_hint(hint);
        }
        for example in &config.examples {
            let mut rendered = ToolExample::new(&example.description, example.arguments.clone());
            if let Some(expected) = &example.expected_output {
                rendered = rendered.with_expected_output(expected);
            }
            definition = definition.with_example(rendered);
        }

        let mut params = Vec::with_capacity(config.params.len());
        for param in &config.params {
            let location = resolve_location(param, &path_vars, config.method);
            if location != ParamLocation::Path && path_vars.contains(&param.name.as_str()) {
                return Err(RestError::config(format!(
                    "tool '{}': parameter '{}' appears in the path but is declared as {location:?}",
                    config.title, param.name
                )));
            }
            let has_client_default = client.defaults.contains_key(&param.name);
            definition = definition.with_parameter(parameter_definition(
                param,
                location,
                has_client_default,
            ));
            params.push(BoundParam {
                name: param.name.clone(),
                location,
            });
        }

        for var in &path_vars {
            if !params.iter().any(|p| p.name == *var) {
                return Err(RestError::config(format!(
                    "tool '{}': path variable '{var}' has no parameter",
                    config.title
                )));
            }
        }

        definition.validate()?;
        Ok(Self {
            definition,
            method: config.method,
            path,
            params,
            select: config.select.clone(),
            client,
        })
    }

    /// The HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Build endpoint, query and body from validated arguments.
    fn request_parts(
        &self,
        args: &JsonObject,
    ) -> std::result::Result<(String, Vec<(String, String)>, Option<Value>), ToolError> {
        let mut path_vars = UriVariables::new();
        let mut query = Vec::new();
        let mut body = Map::new();

        for param in &self.params {
            let Some(value) = args
                .get(&param.name)
                .filter(|v| !v.is_null())
                .or_else(|| self.client.defaults.get(&param.name))
            else {
                continue;
            };
            match param.location {
                ParamLocation::Path => {
                    path_vars.insert(param.name.clone(), scalar_string(value));
                }
                ParamLocation::Query => match value {
                    Value::Array(items) => query.extend(
                        items
                            .iter()
                            .map(|item| (param.name.clone(), scalar_string(item))),
                    ),
                    other => query.push((param.name.clone(), scalar_string(other))),
                },
                ParamLocation::Body => {
                    body.insert(param.name.clone(), value.clone());
                }
            }
        }

        let endpoint = self
            .path
            .expand(&path_vars)
            .map_err(|e| ToolError::domain(format!("{}: {e}", self.definition.title)))?;
        let body = (self.method.has_body() || !body.is_empty()).then_some(Value::Object(body));
        Ok((endpoint, query, body))
    }
}

#[async_trait]
impl Tool for RestTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: JsonObject,
        _ctx: ToolContext,
    ) -> std::result::Result<Value, ToolError> {
        let (endpoint, query, body) = self.request_parts(&args)?;
        let response = self
            .client
            .api
            .call(self.method, &endpoint, &query, body.as_ref())
            .await
            .map_err(|e| e.into_tool_error(&self.client.name))?;
        Ok(select(response, self.select.as_deref()))
    }
}

/// Reads a resource by GETting its endpoint.
#[derive(Debug)]
pub struct RestResource {
    endpoint: UriTemplate,
    select: Option<String>,
    client: Arc<ClientContext>,
}

impl RestResource {
    /// Compile a configured resource into its definition and handler.
    pub fn from_config(
        config: &RestResourceConfig,
        client: Arc<ClientContext>,
    ) -> Result<(ResourceDefinition, Self)> {
        let endpoint = UriTemplate::parse(&config.endpoint)?;
        let path = UriTemplate::parse(&config.path)?;
        for var in endpoint.variables() {
            if !path.variables().contains(&var) {
                return Err(RestError::config(format!(
                    "resource '{}': endpoint variable '{var}' is not in the path",
                    config.name
                )));
            }
        }

        let mut definition = ResourceDefinition::new(&config.name, &config.path);
        if let Some(title) = &config.title {
            definition = definition.with_title(title);
        }
        if let Some(description) = &config.description {
            definition = definition.with_description(description);
        }
        if let Some(mime_type) = &config.mime_type {
            definition = definition.with_mime_type(mime_type);
        }

        Ok((
            definition,
            Self {
                endpoint,
                select: config.select.clone(),
                client,
            },
        ))
    }
}

#[async_trait]
impl ResourceHandler for RestResource {
    async fn read(&self, _uri: &str, vars: &UriVariables) -> std::result::Result<Value, ToolError> {
        let endpoint = self
            .endpoint
            .expand(vars)
            .map_err(|e| ToolError::domain(e.to_string()))?;
        let response = self
            .client
            .api
            .get(&endpoint)
            .await
            .map_err(|e| e.into_tool_error(&self.client.name))?;
        Ok(select(response, self.select.as_deref()))
    }
}

fn resolve_location(
    param: &RestParamConfig,
    path_vars: &[&str],
    method: HttpMethod,
) -> ParamLocation {
    param.location.unwrap_or_else(|| {
        if path_vars.contains(&param.name.as_str()) {
            ParamLocation::Path
        } else if method.has_body() {
            ParamLocation::Body
        } else {
            ParamLocation::Query
        }
    })
}

fn parameter_definition(
    param: &RestParamConfig,
    location: ParamLocation,
    has_client_default: bool,
) -> ParameterDefinition {
    let mut param_type = match (&param.enum_values, param.kind) {
        (Some(values), _) => ParamType::enumeration(values.iter().cloned()),
        (None, ParamKind::String) => ParamType::string(),
        (None, ParamKind::Integer) => ParamType::integer(),
        (None, ParamKind::Number) => ParamType::number(),
        (None, ParamKind::Boolean) => ParamType::boolean(),
        (None, ParamKind::Array) => ParamType::array(ParamType::any()),
        (None, ParamKind::Object) => ParamType::object(ObjectSchema::new()),
        (None, ParamKind::Any) => ParamType::any(),
    };
    if let Some(default) = &param.default {
        param_type = param_type.with_default(default.clone());
    }

    // Path parameters cannot be left out of the URL.
    let required = (param.required || location == ParamLocation::Path)
        && param.default.is_none()
        && !has_client_default;
    let definition = if required {
        ParameterDefinition::required(&param.name, param_type, &param.description)
    } else {
        ParameterDefinition::optional(&param.name, param_type, &param.description)
    };
    definition.with_examples(param.examples.iter().cloned())
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn select(value: Value, pointer: Option<&str>) -> Value {
    match pointer {
        Some(pointer) => value.pointer(pointer).cloned().unwrap_or(Value::Null),
        None => value,
    }
}
