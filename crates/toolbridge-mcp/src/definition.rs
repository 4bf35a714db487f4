//! Declarative tool definitions.
//!
//! A [`ToolDefinition`] is the product-neutral description of one tool:
//! title, summary, parameters, examples and behavioural hints. The server
//! facade turns it into an MCP tool descriptor (see [`crate::schema`] and
//! [`crate::description`]) and uses the same parameter list to validate
//! arguments before a tool runs (see [`crate::validate`]).
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use toolbridge_mcp::definition::{ParamType, ParameterDefinition, ToolDefinition, ToolExample};
//!
//! let def = ToolDefinition::new("List Things", "List things in a project")
//!     .with_parameter(
//!         ParameterDefinition::required("project_id", ParamType::string(), "Project to list")
//!             .with_examples(["515fb9337c1074f6fd000003"]),
//!     )
//!     .with_parameter(ParameterDefinition::optional("limit", ParamType::integer(), "Page size"))
//!     .with_example(ToolExample::new("First page", json!({"project_id": "abc"})))
//!     .read_only(true);
//!
//! assert_eq!(def.parameters.len(), 2);
//! ```

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashSet;

/// JSON object type used for tool arguments and schemas.
pub type JsonObject = serde_json::Map<String, Value>;

// ============================================================================
// Validation rules
// ============================================================================

/// Well-known string formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringFormat {
    /// RFC 4122 UUID.
    Uuid,
    /// Absolute URL with a scheme.
    Url,
    /// E-mail address.
    Email,
    /// RFC 3339 timestamp.
    DateTime,
}

impl StringFormat {
    /// JSON Schema `format` keyword for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Url => "uri",
            Self::Email => "email",
            Self::DateTime => "date-time",
        }
    }
}

/// Constraints on a string value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringRules {
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Regular expression the value must match.
    pub pattern: Option<String>,
    /// Well-known format.
    pub format: Option<StringFormat>,
}

/// Constraints on a numeric value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberRules {
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
    /// Only whole numbers are accepted.
    pub integer: bool,
}

// ============================================================================
// ParamType
// ============================================================================

/// A validation node describing the accepted shape of a value.
///
/// Scalar and collection nodes describe the value itself; `Optional`,
/// `Nullable`, `Default` and `Described` wrap another node and change how
/// it is treated when absent, null, or rendered.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamType {
    /// A string.
    String(StringRules),
    /// A number (or integer, see [`NumberRules::integer`]).
    Number(NumberRules),
    /// `true` or `false`.
    Boolean,
    /// A homogeneous array.
    Array(Box<ParamType>),
    /// A nested object.
    Object(ObjectSchema),
    /// One of a fixed set of strings.
    Enum(Vec<String>),
    /// Exactly this value.
    Literal(Value),
    /// Any of the listed shapes.
    Union(Vec<ParamType>),
    /// Anything.
    Any,
    /// May be omitted.
    Optional(Box<ParamType>),
    /// May be `null`.
    Nullable(Box<ParamType>),
    /// May be omitted; the value is filled in when it is.
    Default(Box<ParamType>, Value),
    /// Carries its own description.
    Described(Box<ParamType>, String),
}

impl ParamType {
    /// An unconstrained string.
    pub fn string() -> Self {
        Self::String(StringRules::default())
    }

    /// A string with rules.
    pub fn string_with(rules: StringRules) -> Self {
        Self::String(rules)
    }

    /// Any number.
    pub fn number() -> Self {
        Self::Number(NumberRules::default())
    }

    /// A whole number.
    pub fn integer() -> Self {
        Self::Number(NumberRules {
            integer: true,
            ..NumberRules::default()
        })
    }

    /// A number with rules.
    pub fn number_with(rules: NumberRules) -> Self {
        Self::Number(rules)
    }

    /// A boolean.
    pub fn boolean() -> Self {
        Self::Boolean
    }

    /// An array of `items`.
    pub fn array(items: ParamType) -> Self {
        Self::Array(Box::new(items))
    }

    /// A nested object.
    pub fn object(schema: ObjectSchema) -> Self {
        Self::Object(schema)
    }

    /// One of `values`.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Exactly `value`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Any of `variants`.
    pub fn union(variants: Vec<ParamType>) -> Self {
        Self::Union(variants)
    }

    /// Anything.
    pub fn any() -> Self {
        Self::Any
    }

    /// Wrap as optional.
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    /// Wrap as nullable.
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Wrap with a default value.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        Self::Default(Box::new(self), value.into())
    }

    /// Attach a description.
    pub fn describe(self, description: impl Into<String>) -> Self {
        Self::Described(Box::new(self), description.into())
    }

    /// Returns `true` if an absent value is acceptable.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) | Self::Default(..) => true,
            Self::Described(inner, _) | Self::Nullable(inner) => inner.is_optional(),
            _ => false,
        }
    }

    /// The outermost attached description, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Described(_, text) => Some(text),
            Self::Optional(inner) | Self::Nullable(inner) | Self::Default(inner, _) => {
                inner.description()
            }
            _ => None,
        }
    }

    /// The default value, if one is attached.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Self::Default(_, value) => Some(value),
            Self::Optional(inner) | Self::Nullable(inner) | Self::Described(inner, _) => {
                inner.default_value()
            }
            _ => None,
        }
    }

    /// Strip all wrappers and return the underlying value node.
    pub fn unwrapped(&self) -> &ParamType {
        match self {
            Self::Optional(inner)
            | Self::Nullable(inner)
            | Self::Default(inner, _)
            | Self::Described(inner, _) => inner.unwrapped(),
            other => other,
        }
    }

    fn check(&self, path: &str) -> std::result::Result<(), String> {
        match self {
            Self::String(rules) => {
                if let (Some(min), Some(max)) = (rules.min_length, rules.max_length)
                    && min > max
                {
                    return Err(format!("'{path}' has min_length {min} > max_length {max}"));
                }
                if let Some(pattern) = &rules.pattern {
                    regex::Regex::new(pattern)
                        .map_err(|e| format!("'{path}' has an invalid pattern: {e}"))?;
                }
                Ok(())
            }
            Self::Number(rules) => match (rules.minimum, rules.maximum) {
                (Some(min), Some(max)) if min > max => {
                    Err(format!("'{path}' has minimum {min} > maximum {max}"))
                }
                _ => Ok(()),
            },
            Self::Enum(values) if values.is_empty() => Err(format!("'{path}' has an empty enum")),
            Self::Union(variants) if variants.is_empty() => {
                Err(format!("'{path}' has an empty union"))
            }
            Self::Union(variants) => variants.iter().try_for_each(|v| v.check(path)),
            Self::Array(items) => items.check(&format!("{path}[]")),
            Self::Object(schema) => schema.check(path),
            Self::Optional(inner)
            | Self::Nullable(inner)
            | Self::Default(inner, _)
            | Self::Described(inner, _) => inner.check(path),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// ObjectSchema
// ============================================================================

/// A field of an [`ObjectSchema`].
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaField {
    /// Field name.
    pub name: String,
    /// Field type; optionality is the type's own wrapper.
    pub param_type: ParamType,
}

/// An ordered object schema.
///
/// Field order is declaration order and is preserved in generated
/// descriptions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectSchema {
    /// Fields in declaration order.
    pub fields: Vec<SchemaField>,
}

impl ObjectSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            param_type,
        });
        self
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn check(&self, path: &str) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            let field_path = if path.is_empty() {
                field.name.clone()
            } else {
                format!("{path}.{}", field.name)
            };
            if !seen.insert(field.name.as_str()) {
                return Err(format!("duplicate field '{field_path}'"));
            }
            field.param_type.check(&field_path)?;
        }
        Ok(())
    }
}

// ============================================================================
// ParameterDefinition
// ============================================================================

/// One entry of a tool's flat parameter list.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDefinition {
    /// Parameter name, unique within a tool.
    pub name: String,
    /// Accepted shape.
    pub param_type: ParamType,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Human-readable description.
    pub description: String,
    /// Example values, rendered as `(e.g. ...)`.
    pub examples: Vec<String>,
    /// Extra constraints, rendered as nested bullets.
    pub constraints: Vec<String>,
}

impl ParameterDefinition {
    /// A parameter that must be supplied.
    pub fn required(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: true,
            description: description.into(),
            examples: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// A parameter that may be omitted.
    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    /// Set example values.
    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }

    /// Set constraint notes.
    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints = constraints.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// ToolExample
// ============================================================================

/// A documented example invocation. Never executed.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolExample {
    /// What the example demonstrates.
    pub description: String,
    /// Example arguments.
    pub parameters: Value,
    /// What the caller should expect back.
    pub expected_output: Option<String>,
}

impl ToolExample {
    /// Create an example.
    pub fn new(description: impl Into<String>, parameters: Value) -> Self {
        Self {
            description: description.into(),
            parameters,
            expected_output: None,
        }
    }

    /// Describe the expected output.
    pub fn with_expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }
}

// ============================================================================
// ToolDefinition
// ============================================================================

/// Everything the server needs to describe, validate and name a tool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolDefinition {
    /// Human-readable title; the global tool name is derived from it.
    pub title: String,
    /// One-paragraph summary; first line of the description.
    pub summary: String,
    /// Longer statement of intent.
    pub purpose: Option<String>,
    /// When to reach for this tool.
    pub use_cases: Vec<String>,
    /// Flat parameter list.
    pub parameters: Vec<ParameterDefinition>,
    /// Structured schema merged in after the flat list.
    pub input_schema: Option<ObjectSchema>,
    /// Documented example invocations.
    pub examples: Vec<ToolExample>,
    /// Usage hints for the calling agent.
    pub hints: Vec<String>,
    /// Shape of the output.
    pub output_format: Option<String>,
    /// The tool does not modify its environment.
    pub read_only: Option<bool>,
    /// The tool may perform destructive updates.
    pub destructive: Option<bool>,
    /// Repeating a call with the same arguments has no further effect.
    pub idempotent: Option<bool>,
    /// The tool interacts with external entities.
    pub open_world: Option<bool>,
}

impl ToolDefinition {
    /// Start a definition with a title and summary.
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Set the purpose.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Add a use case.
    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_cases.push(use_case.into());
        self
    }

    /// Add a parameter.
    pub fn with_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set the structured input schema.
    pub fn with_input_schema(mut self, schema: ObjectSchema) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Add an example.
    pub fn with_example(mut self, example: ToolExample) -> Self {
        self.examples.push(example);
        self
    }

    /// Add a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Set the output format note.
    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = Some(output_format.into());
        self
    }

    /// Mark as read-only (or not).
    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = Some(value);
        self
    }

    /// Mark as destructive (or not).
    pub fn destructive(mut self, value: bool) -> Self {
        self.destructive = Some(value);
        self
    }

    /// Mark as idempotent (or not).
    pub fn idempotent(mut self, value: bool) -> Self {
        self.idempotent = Some(value);
        self
    }

    /// Mark as open-world (or not).
    pub fn open_world(mut self, value: bool) -> Self {
        self.open_world = Some(value);
        self
    }

    /// Returns `true` unless the tool is explicitly marked read-only.
    pub fn is_mutating(&self) -> bool {
        self.read_only != Some(true)
    }

    /// Check the definition for defects that must abort registration:
    /// empty title, duplicate parameter names, contradictory rules,
    /// and patterns that do not compile.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Error::InvalidDefinition {
            tool: self.title.clone(),
            message,
        };

        if self.title.trim().is_empty() {
            return Err(invalid("title must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.name.is_empty() {
                return Err(invalid("parameter name must not be empty".to_string()));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(invalid(format!("duplicate parameter '{}'", param.name)));
            }
            param.param_type.check(&param.name).map_err(invalid)?;
        }

        if let Some(schema) = &self.input_schema {
            schema.check("").map_err(invalid)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
