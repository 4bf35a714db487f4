//! Error types for toolbridge-mcp-rest

use thiserror::Error;
use toolbridge_mcp::ToolError;

/// Result type alias for toolbridge-mcp-rest operations
pub type Result<T> = std::result::Result<T, RestError>;

/// Errors from REST backends and their configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RestError {
    /// Error from toolbridge-mcp
    #[error(transparent)]
    Mcp(#[from] toolbridge_mcp::Error),

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A URL could not be built.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        message: String,
    },

    /// A header name or value is not valid HTTP.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// Header name
        name: String,
    },

    /// A credential environment variable is not set.
    #[error("Client '{client}' is missing credential variable {var}")]
    MissingCredential {
        /// Client prefix
        client: String,
        /// Environment variable name
        var: String,
    },

    /// A token source could not produce or refresh a token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A tool or resource declaration is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RestError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        RestError::Config(message.into())
    }

    /// Creates an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>, message: impl ToString) -> Self {
        RestError::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// The HTTP status, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Status { status, .. } => Some(*status),
            RestError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for a 4xx answer from the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RestError::Status { status, .. } if (400..500).contains(status))
    }

    /// Classify for the dispatch boundary: 4xx answers are the caller's
    /// problem and surface verbatim; everything else is unexpected.
    pub fn into_tool_error(self, client: &str) -> ToolError {
        match self {
            RestError::Status { status, body } if (400..500).contains(&status) => {
                ToolError::domain(format!("{client} API error (status {status}): {body}"))
            }
            other => ToolError::unexpected(other),
        }
    }
}
