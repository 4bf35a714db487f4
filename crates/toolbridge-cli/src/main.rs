//! `toolbridge` entry point.

use clap::Parser;
use toolbridge_cli::config_handlers::handle_config_command;
use toolbridge_cli::logging::init_logging;
use toolbridge_cli::{Cli, Command, Config, build_server, render_tools};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.selected() {
        Command::Config { action } => handle_config_command(config_path, action)?,
        Command::Serve => {
            let config = Config::load(config_path)?;
            init_logging(&config.logging, cli.verbose)?;
            let server = build_server(&config).await?;
            server.serve_stdio().await?;
        }
        Command::Tools { json } => {
            let config = Config::load(config_path)?;
            init_logging(&config.logging, cli.verbose)?;
            let server = build_server(&config).await?;
            print!("{}", render_tools(&server.tool_summaries(), json)?);
        }
    }

    Ok(())
}
