//! # toolbridge-cli
//!
//! The `toolbridge` binary: loads a TOML configuration describing REST
//! backends, registers their tools on one MCP server and serves it over
//! stdio.
//!
//! ```text
//! toolbridge                      # serve (default)
//! toolbridge tools --json         # list what would be registered
//! toolbridge config init          # write a starter config
//! toolbridge config get server.name
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod logging;

pub use app::{build_server, build_server_with, render_tools};
pub use cli::{Cli, Command, ConfigAction};
pub use config::Config;
pub use error::{Error, Result};
