//! Translation of tool definitions into JSON Schema.
//!
//! The MCP `tools/list` response carries an `inputSchema` per tool. It is
//! built from the flat parameter list first, then the structured schema's
//! fields are merged in. A structured field with the same name as a flat
//! parameter replaces it.

use crate::definition::{JsonObject, ObjectSchema, ParamType, ToolDefinition};
use serde_json::{Map, Value, json};

/// Build the `inputSchema` object for a tool.
pub fn build_input_schema(def: &ToolDefinition) -> JsonObject {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();

    for param in &def.parameters {
        let mut schema = param_json_schema(&param.param_type);
        if !param.description.is_empty() {
            set_description(&mut schema, &param.description);
        }
        properties.insert(param.name.clone(), schema);
        if param.required {
            required.push(param.name.clone());
        }
    }

    if let Some(input) = &def.input_schema {
        for field in &input.fields {
            properties.insert(field.name.clone(), param_json_schema(&field.param_type));
            required.retain(|name| name != &field.name);
            if !field.param_type.is_optional() {
                required.push(field.name.clone());
            }
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    schema
}

/// Map a single validation node to JSON Schema.
pub fn param_json_schema(param_type: &ParamType) -> Value {
    match param_type {
        ParamType::String(rules) => {
            let mut schema = json!({"type": "string"});
            if let Some(min) = rules.min_length {
                schema["minLength"] = json!(min);
            }
            if let Some(max) = rules.max_length {
                schema["maxLength"] = json!(max);
            }
            if let Some(pattern) = &rules.pattern {
                schema["pattern"] = json!(pattern);
            }
            if let Some(format) = rules.format {
                schema["format"] = json!(format.as_str());
            }
            schema
        }
        ParamType::Number(rules) => {
            let kind = if rules.integer { "integer" } else { "number" };
            let mut schema = json!({"type": kind});
            if let Some(min) = rules.minimum {
                schema["minimum"] = json!(min);
            }
            if let Some(max) = rules.maximum {
                schema["maximum"] = json!(max);
            }
            schema
        }
        ParamType::Boolean => json!({"type": "boolean"}),
        ParamType::Array(items) => json!({"type": "array", "items": param_json_schema(items)}),
        ParamType::Object(schema) => object_json_schema(schema),
        ParamType::Enum(values) => json!({"type": "string", "enum": values}),
        ParamType::Literal(value) => json!({"const": value}),
        ParamType::Union(variants) => {
            let any_of: Vec<Value> = variants.iter().map(param_json_schema).collect();
            json!({"anyOf": any_of})
        }
        ParamType::Any => json!({}),
        ParamType::Optional(inner) => param_json_schema(inner),
        ParamType::Nullable(inner) => {
            json!({"anyOf": [param_json_schema(inner), {"type": "null"}]})
        }
        ParamType::Default(inner, value) => {
            let mut schema = param_json_schema(inner);
            if let Value::Object(map) = &mut schema {
                map.insert("default".to_string(), value.clone());
            }
            schema
        }
        ParamType::Described(inner, text) => {
            let mut schema = param_json_schema(inner);
            set_description(&mut schema, text);
            schema
        }
    }
}

fn object_json_schema(schema: &ObjectSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &schema.fields {
        properties.insert(field.name.clone(), param_json_schema(&field.param_type));
        if !field.param_type.is_optional() {
            required.push(field.name.clone());
        }
    }
    let mut out = json!({"type": "object", "properties": properties});
    if !required.is_empty() {
        out["required"] = json!(required);
    }
    out
}

fn set_description(schema: &mut Value, text: &str) {
    if let Value::Object(map) = schema {
        map.insert("description".to_string(), json!(text));
    }
}

/// Human-readable type name used in generated descriptions.
///
/// Wrappers are looked through; anything without a dedicated name is
/// `any`.
pub fn readable_type(param_type: &ParamType) -> &'static str {
    match param_type.unwrapped() {
        ParamType::String(_) => "string",
        ParamType::Number(_) => "number",
        ParamType::Boolean => "boolean",
        ParamType::Array(_) => "array",
        ParamType::Object(_) => "object",
        ParamType::Enum(_) => "enum",
        ParamType::Literal(_) => "literal",
        ParamType::Union(_) => "union",
        _ => "any",
    }
}

// ============================================================================
// Tests
// ============================================================================
