//! Error types for toolbridge-cli

use thiserror::Error;

/// Result type alias for toolbridge-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in toolbridge-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from toolbridge-core
    #[error("Core error: {0}")]
    Core(#[from] toolbridge_core::Error),

    /// Error from toolbridge-mcp
    #[error("Server error: {0}")]
    Mcp(#[from] toolbridge_mcp::Error),

    /// Error from toolbridge-mcp-rest
    #[error("Client error: {0}")]
    Rest(#[from] toolbridge_mcp_rest::RestError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),
}
