//! Client-scoped resources addressed by URI templates.
//!
//! Templates are RFC 6570 level 1: literal text plus `{var}` expressions.
//! A variable matches one non-empty path segment (no `/`). Adjacent
//! variables are rejected because they cannot be split unambiguously.

use crate::error::{Error, Result, ToolError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Variables extracted from a URI.
pub type UriVariables = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed URI template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UriTemplate {
    template: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Parse a template.
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |message: &str| Error::invalid_uri_template(template, message);

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(invalid("unclosed '{'"));
                    }
                    if name.is_empty() {
                        return Err(invalid("empty variable name"));
                    }
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid(&format!("invalid variable name '{name}'")));
                    }
                    if literal.is_empty() && matches!(segments.last(), Some(Segment::Variable(_))) {
                        return Err(invalid("adjacent variables"));
                    }
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Variable(v) if *v == name))
                    {
                        return Err(invalid(&format!("duplicate variable '{name}'")));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(name));
                }
                '}' => return Err(invalid("unmatched '}'")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Variable names in order of appearance.
    pub fn variables(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Variable(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Match `uri` and extract its variables, percent-decoded.
    pub fn matches(&self, uri: &str) -> Option<UriVariables> {
        let mut vars = UriVariables::new();
        let mut rest = uri;

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    rest = rest.strip_prefix(lit.as_str())?;
                }
                Segment::Variable(name) => {
                    let end = match self.segments.get(i + 1) {
                        Some(Segment::Literal(next)) => rest.find(next.as_str())?,
                        _ => rest.len(),
                    };
                    let raw = &rest[..end];
                    if raw.is_empty() || raw.contains('/') {
                        return None;
                    }
                    vars.insert(name.clone(), decode_component(raw)?);
                    rest = &rest[end..];
                }
            }
        }

        rest.is_empty().then_some(vars)
    }

    /// Substitute `vars` into the template, percent-encoding values.
    pub fn expand(&self, vars: &UriVariables) -> Result<String> {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Variable(name) => {
                    let value = vars.get(name).ok_or_else(|| {
                        Error::invalid_uri_template(
                            &self.template,
                            format!("missing value for '{name}'"),
                        )
                    })?;
                    out.push_str(&urlencoding::encode(value));
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Decode one matched variable. Every `%` must start a two-hex-digit
/// escape and the result must be UTF-8.
fn decode_component(raw: &str) -> Option<String> {
    let well_formed = raw.split('%').skip(1).all(|escape| {
        escape
            .as_bytes()
            .get(..2)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return None;
    }
    urlencoding::decode(raw).ok().map(|decoded| decoded.into_owned())
}

// ============================================================================
// Resource registration
// ============================================================================

/// Declaration of a client resource.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceDefinition {
    /// First URI segment after the prefix, e.g. `event`
    pub name: String,
    /// Path template after the name, e.g. `{event_id}`
    pub path_template: String,
    /// Human-readable title
    pub title: Option<String>,
    /// What the resource contains
    pub description: Option<String>,
    /// MIME type of the contents
    pub mime_type: Option<String>,
}

impl ResourceDefinition {
    /// Create a resource declaration.
    pub fn new(name: impl Into<String>, path_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path_template: path_template.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Reads one resource.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Produce the contents for `uri`, with template variables extracted.
    async fn read(&self, uri: &str, vars: &UriVariables) -> std::result::Result<Value, ToolError>;
}

// ============================================================================
// Tests
// ============================================================================
