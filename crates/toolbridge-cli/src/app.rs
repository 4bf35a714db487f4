//! Builds the server from configuration.

use crate::config::Config;
use crate::error::Result;
use toolbridge_mcp::{HealthClient, McpServer, ToolSummary};
use toolbridge_mcp_rest::{RestClient, RestError};

/// Build a server with credentials read from the process environment.
pub async fn build_server(config: &Config) -> Result<McpServer> {
    build_server_with(config, |var| std::env::var(var).ok()).await
}

/// Build a server with an explicit credential lookup.
///
/// The health client is always registered first. A client whose
/// credential variable is unset is skipped with a warning; any other
/// client error aborts startup.
pub async fn build_server_with<F>(config: &Config, lookup: F) -> Result<McpServer>
where
    F: Fn(&str) -> Option<String>,
{
    config.validate()?;
    let mut server = McpServer::new(config.server_config());

    let health = HealthClient::for_server(&server);
    server.add_client(&health).await?;

    let discovery = config.discovery_config();
    for client_config in &config.clients {
        let auth = match client_config.auth.resolve_with(&client_config.prefix, &lookup) {
            Ok(auth) => auth,
            Err(RestError::MissingCredential { client, var }) => {
                tracing::warn!(client = %client, var = %var, "Credential not set; client disabled");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let client = RestClient::new(client_config, auth)?.with_discovery(discovery.clone());
        server.add_client(&client).await?;
    }

    tracing::info!(tools = server.tool_count(), "Server ready");
    Ok(server)
}

/// Render tool summaries as an aligned table or pretty JSON.
pub fn render_tools(summaries: &[ToolSummary], json: bool) -> Result<String> {
    if json {
        let rendered =
            serde_json::to_string_pretty(summaries).map_err(toolbridge_core::Error::from)?;
        return Ok(rendered);
    }

    let name_width = column_width(summaries.iter().map(|s| s.name.as_str()), "NAME");
    let title_width = column_width(summaries.iter().map(|s| s.title.as_str()), "TITLE");

    let mut out = format!("{:<name_width$}  {:<title_width$}  MODE\n", "NAME", "TITLE");
    for summary in summaries {
        let mode = if summary.read_only { "read-only" } else { "mutating" };
        out.push_str(&format!(
            "{:<name_width$}  {:<title_width$}  {mode}\n",
            summary.name, summary.title
        ));
    }
    Ok(out)
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values.map(str::len).chain([header.len()]).max().unwrap_or(0)
}
