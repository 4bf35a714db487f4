//! Deterministic tool descriptions.
//!
//! The description is the only documentation an agent sees for a tool, so
//! its layout is fixed: summary, then Parameters, Output Format, Use Cases,
//! Examples and Hints, each section omitted when empty and separated by a
//! blank line.

use crate::definition::{ParamType, ParameterDefinition, ToolDefinition};
use crate::schema::readable_type;

/// Render the description for a tool.
pub fn build_description(def: &ToolDefinition) -> String {
    let mut sections: Vec<String> = vec![def.summary.clone()];

    if !def.parameters.is_empty() {
        let bullets: Vec<String> = def.parameters.iter().map(parameter_bullet).collect();
        sections.push(format!("**Parameters:**\n{}", bullets.join("\n")));
    } else if let Some(schema) = def.input_schema.as_ref().filter(|s| !s.is_empty()) {
        let bullets: Vec<String> = schema
            .fields
            .iter()
            .map(|field| field_bullet(&field.name, &field.param_type))
            .collect();
        sections.push(format!("**Parameters:**\n{}", bullets.join("\n")));
    }

    if let Some(output_format) = &def.output_format {
        sections.push(format!("**Output Format:** {output_format}"));
    }

    if !def.use_cases.is_empty() {
        sections.push(format!("**Use Cases:** {}", numbered(&def.use_cases)));
    }

    if !def.examples.is_empty() {
        let examples: Vec<String> = def
            .examples
            .iter()
            .enumerate()
            .map(|(i, example)| {
                let params = serde_json::to_string_pretty(&example.parameters)
                    .unwrap_or_else(|_| example.parameters.to_string());
                let mut text = format!("{}. {}\n```json\n{params}\n```", i + 1, example.description);
                if let Some(expected) = &example.expected_output {
                    text.push_str(&format!("\nExpected Output: {expected}"));
                }
                text
            })
            .collect();
        sections.push(format!("**Examples:**\n{}", examples.join("\n\n")));
    }

    if !def.hints.is_empty() {
        sections.push(format!("**Hints:** {}", numbered(&def.hints)));
    }

    sections.join("\n\n").trim().to_string()
}

fn parameter_bullet(param: &ParameterDefinition) -> String {
    let mut line = format!("- {} ({})", param.name, readable_type(&param.param_type));
    if param.required {
        line.push_str(" *required*");
    }
    if !param.description.is_empty() {
        line.push_str(": ");
        line.push_str(&param.description);
    }
    if !param.examples.is_empty() {
        line.push_str(&format!(" (e.g. {})", param.examples.join(", ")));
    }
    for constraint in &param.constraints {
        line.push_str("\n  - ");
        line.push_str(constraint);
    }
    line
}

fn field_bullet(name: &str, param_type: &ParamType) -> String {
    let mut line = format!("- {name} ({})", readable_type(param_type));
    if !param_type.is_optional() {
        line.push_str(" *required*");
    }
    if let Some(description) = param_type.description() {
        line.push_str(": ");
        line.push_str(description);
    }
    line
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
