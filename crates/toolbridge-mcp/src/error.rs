//! Error types for toolbridge-mcp
//!
//! Two families live here:
//!
//! - [`Error`]: registration-time failures (duplicate names, malformed
//!   definitions). These abort `add_client` and are the caller's problem.
//! - [`ToolError`]: what a tool returns when an invocation fails. The
//!   dispatch boundary turns it into an error result; it never escapes to
//!   the transport.

use thiserror::Error;

/// Result type alias for toolbridge-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while registering clients, tools and resources.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A tool with the same name is already registered.
    #[error("Tool '{name}' is already registered")]
    DuplicateTool {
        /// The colliding name
        name: String,
    },

    /// A resource with the same URI template is already registered.
    #[error("Resource '{uri}' is already registered")]
    DuplicateResource {
        /// The colliding URI template
        uri: String,
    },

    /// A tool definition is malformed.
    #[error("Invalid definition for tool '{tool}': {message}")]
    InvalidDefinition {
        /// Tool title
        tool: String,
        /// What is wrong
        message: String,
    },

    /// A URI template could not be parsed.
    #[error("Invalid URI template '{template}': {message}")]
    InvalidUriTemplate {
        /// The offending template
        template: String,
        /// What is wrong
        message: String,
    },

    /// The MCP transport failed.
    #[error("Transport error: {message}")]
    Transport {
        /// Failure description
        message: String,
    },
}

impl Error {
    /// Creates a duplicate-tool error.
    pub fn duplicate_tool(name: impl Into<String>) -> Self {
        Error::DuplicateTool { name: name.into() }
    }

    /// Creates a duplicate-resource error.
    pub fn duplicate_resource(uri: impl Into<String>) -> Self {
        Error::DuplicateResource { uri: uri.into() }
    }

    /// Creates an invalid-URI-template error.
    pub fn invalid_uri_template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidUriTemplate {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }
}

// ============================================================================
// ToolError
// ============================================================================

/// Failure of a single tool invocation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ToolError {
    /// An anticipated failure whose message is safe and useful to show the
    /// caller verbatim (backend rejected the request, entity not found, ...).
    #[error("{message}")]
    Domain {
        /// Message shown to the caller
        message: String,
    },

    /// Anything else. The caller sees a generic message and the error is
    /// reported to telemetry.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ToolError {
    /// Creates a domain error.
    pub fn domain(message: impl Into<String>) -> Self {
        ToolError::Domain {
            message: message.into(),
        }
    }

    /// Wraps any error as unexpected.
    pub fn unexpected<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ToolError::Unexpected(anyhow::Error::new(error))
    }

    /// Returns `true` for [`ToolError::Domain`].
    pub fn is_domain(&self) -> bool {
        matches!(self, ToolError::Domain { .. })
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::unexpected(err)
    }
}
