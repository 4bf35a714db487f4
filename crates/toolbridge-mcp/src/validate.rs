//! Argument validation.
//!
//! Arguments are checked against a tool's parameters before the tool runs.
//! On success the returned object has declared defaults filled in. Keys
//! that no parameter declares are passed through untouched.

use crate::definition::{JsonObject, ObjectSchema, ParamType, StringFormat, StringRules, ToolDefinition};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("Invalid uuid regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+\S*$").expect("Invalid url regex")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[Tt]\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})$")
        .expect("Invalid date-time regex")
});

/// What went wrong with one argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationErrorKind {
    /// A required value is absent.
    Missing,
    /// The value has the wrong JSON type.
    InvalidType {
        /// Expected type
        expected: String,
        /// JSON type actually supplied
        found: &'static str,
    },
    /// The value has the right type but breaks a rule.
    Constraint(String),
}

/// A validation failure, located by a dotted path such as `filter.tags[2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
    /// Location of the offending value
    pub path: String,
    /// Failure kind
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    fn missing(path: &str) -> Self {
        Self {
            path: path.to_string(),
            kind: ValidationErrorKind::Missing,
        }
    }

    fn invalid_type(path: &str, expected: impl Into<String>, found: &Value) -> Self {
        Self {
            path: path.to_string(),
            kind: ValidationErrorKind::InvalidType {
                expected: expected.into(),
                found: json_type(found),
            },
        }
    }

    fn constraint(path: &str, detail: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            kind: ValidationErrorKind::Constraint(detail.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::Missing => {
                write!(f, "missing required parameter '{}'", self.path)
            }
            ValidationErrorKind::InvalidType { expected, found } => write!(
                f,
                "parameter '{}' has wrong type: expected {expected}, got {found}",
                self.path
            ),
            ValidationErrorKind::Constraint(detail) => {
                write!(f, "parameter '{}' is invalid: {detail}", self.path)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate `args` against a tool definition.
///
/// Flat parameters are checked first, then structured-schema fields. The
/// first failure is returned.
pub fn validate_arguments(
    def: &ToolDefinition,
    args: &JsonObject,
) -> Result<JsonObject, ValidationError> {
    let mut out = args.clone();

    for param in &def.parameters {
        let value = args.get(&param.name);
        let resolved = if param.required {
            resolve(&param.param_type, value, &param.name)?
        } else {
            match value {
                None => param.param_type.default_value().cloned(),
                Some(v) => Some(resolve_present(&param.param_type, v, &param.name)?),
            }
        };
        if let Some(v) = resolved {
            out.insert(param.name.clone(), v);
        }
    }

    if let Some(schema) = &def.input_schema {
        validate_fields(schema, args, "", &mut out)?;
    }

    Ok(out)
}

fn validate_fields(
    schema: &ObjectSchema,
    input: &JsonObject,
    prefix: &str,
    out: &mut JsonObject,
) -> Result<(), ValidationError> {
    for field in &schema.fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        if let Some(v) = resolve(&field.param_type, input.get(&field.name), &path)? {
            out.insert(field.name.clone(), v);
        }
    }
    Ok(())
}

/// Resolve a possibly absent value. `Ok(None)` means absent and allowed.
fn resolve(
    param_type: &ParamType,
    value: Option<&Value>,
    path: &str,
) -> Result<Option<Value>, ValidationError> {
    match (param_type, value) {
        (ParamType::Described(inner, _), _) => resolve(inner, value, path),
        (ParamType::Optional(_), None) => Ok(None),
        (ParamType::Default(_, default), None) => Ok(Some(default.clone())),
        (ParamType::Nullable(inner), None) => resolve(inner, None, path),
        (_, None) => Err(ValidationError::missing(path)),
        (_, Some(v)) => resolve_present(param_type, v, path).map(Some),
    }
}

fn resolve_present(
    param_type: &ParamType,
    value: &Value,
    path: &str,
) -> Result<Value, ValidationError> {
    match param_type {
        ParamType::Described(inner, _)
        | ParamType::Optional(inner)
        | ParamType::Default(inner, _) => resolve_present(inner, value, path),
        ParamType::Nullable(inner) => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                resolve_present(inner, value, path)
            }
        }
        ParamType::String(rules) => {
            let s = value
                .as_str()
                .ok_or_else(|| ValidationError::invalid_type(path, "string", value))?;
            check_string(rules, s, path)?;
            Ok(value.clone())
        }
        ParamType::Number(rules) => {
            let n = value.as_f64().ok_or_else(|| {
                let expected = if rules.integer { "integer" } else { "number" };
                ValidationError::invalid_type(path, expected, value)
            })?;
            if rules.integer && !(value.is_i64() || value.is_u64() || n.fract() == 0.0) {
                return Err(ValidationError::invalid_type(path, "integer", value));
            }
            if let Some(min) = rules.minimum
                && n < min
            {
                return Err(ValidationError::constraint(
                    path,
                    format!("must be greater than or equal to {min}"),
                ));
            }
            if let Some(max) = rules.maximum
                && n > max
            {
                return Err(ValidationError::constraint(
                    path,
                    format!("must be less than or equal to {max}"),
                ));
            }
            Ok(value.clone())
        }
        ParamType::Boolean => {
            if value.is_boolean() {
                Ok(value.clone())
            } else {
                Err(ValidationError::invalid_type(path, "boolean", value))
            }
        }
        ParamType::Array(items) => {
            let elements = value
                .as_array()
                .ok_or_else(|| ValidationError::invalid_type(path, "array", value))?;
            elements
                .iter()
                .enumerate()
                .map(|(i, el)| resolve_present(items, el, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        ParamType::Object(schema) => {
            let obj = value
                .as_object()
                .ok_or_else(|| ValidationError::invalid_type(path, "object", value))?;
            let mut out = obj.clone();
            validate_fields(schema, obj, path, &mut out)?;
            Ok(Value::Object(out))
        }
        ParamType::Enum(allowed) => {
            let s = value
                .as_str()
                .ok_or_else(|| ValidationError::invalid_type(path, "string", value))?;
            if allowed.iter().any(|a| a == s) {
                Ok(value.clone())
            } else {
                Err(ValidationError::constraint(
                    path,
                    format!("must be one of: {}", allowed.join(", ")),
                ))
            }
        }
        ParamType::Literal(expected) => {
            if value == expected {
                Ok(value.clone())
            } else {
                Err(ValidationError::constraint(path, format!("must be {expected}")))
            }
        }
        ParamType::Union(variants) => variants
            .iter()
            .find_map(|variant| resolve_present(variant, value, path).ok())
            .ok_or_else(|| ValidationError::constraint(path, "does not match any allowed type")),
        ParamType::Any => Ok(value.clone()),
    }
}

fn check_string(rules: &StringRules, s: &str, path: &str) -> Result<(), ValidationError> {
    let len = s.chars().count();
    if let Some(min) = rules.min_length
        && len < min
    {
        return Err(ValidationError::constraint(
            path,
            format!("must be at least {min} characters"),
        ));
    }
    if let Some(max) = rules.max_length
        && len > max
    {
        return Err(ValidationError::constraint(
            path,
            format!("must be at most {max} characters"),
        ));
    }
    if let Some(pattern) = &rules.pattern {
        let re = Regex::new(pattern).map_err(|e| {
            ValidationError::constraint(path, format!("pattern '{pattern}' is invalid: {e}"))
        })?;
        if !re.is_match(s) {
            return Err(ValidationError::constraint(
                path,
                format!("must match pattern '{pattern}'"),
            ));
        }
    }
    if let Some(format) = rules.format {
        let re: &Regex = match format {
            StringFormat::Uuid => &UUID_RE,
            StringFormat::Url => &URL_RE,
            StringFormat::Email => &EMAIL_RE,
            StringFormat::DateTime => &DATE_TIME_RE,
        };
        if !re.is_match(s) {
            return Err(ValidationError::constraint(
                path,
                format!("must be a valid {}", format.as_str()),
            ));
        }
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================
