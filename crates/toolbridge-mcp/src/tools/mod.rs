//! Built-in tools.
//!
//! Tools provided by `toolbridge-mcp` itself, available to every server.

pub mod health;

pub use health::{HealthClient, HealthResponse};
