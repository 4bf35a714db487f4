//! Command-line arguments.

use clap::{Parser, Subcommand};

/// One MCP server for many SaaS backends.
#[derive(Parser, Debug)]
#[command(name = "toolbridge", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "TOOLBRIDGE_CONFIG")]
    pub config: Option<String>,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run; defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve MCP over stdio
    Serve,

    /// List the tools the configured clients would register
    Tools {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Inspect or create the configuration file
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved configuration file path
    Path,

    /// Print a value by dotted key, e.g. `server.name`
    Get {
        /// Dotted key
        key: String,
    },

    /// Write a starter configuration file
    Init {
        /// Where to write it (defaults to the resolved path)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// The command to run.
    pub fn selected(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
