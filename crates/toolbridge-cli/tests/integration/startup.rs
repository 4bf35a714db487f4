//! Building the server from configuration files.

use crate::common::{TWO_CLIENTS, config_file, no_secrets, with_token};
use toolbridge_cli::{Config, Error, build_server_with, render_tools};

fn tool_names(server: &toolbridge_mcp::McpServer) -> Vec<String> {
    server.tool_summaries().into_iter().map(|s| s.name).collect()
}

#[tokio::test]
async fn test_all_clients_registered_when_credentials_present() {
    let (_dir, path) = config_file(TWO_CLIENTS);
    let config = Config::from_file(&path).unwrap();
    let server = build_server_with(&config, with_token).await.unwrap();

    assert_eq!(
        tool_names(&server),
        vec![
            "server_health",
            "tracker_list_issues",
            "tracker_close_issue",
            "wiki_search_pages",
        ]
    );
    assert_eq!(
        server.resource_uri_templates(),
        vec!["tracker://issue/{id}"]
    );
    assert_eq!(server.config().name, "bridge-test");
    assert_eq!(
        server.config().instructions.as_deref(),
        Some("Use tracker tools for issues.")
    );
}

#[tokio::test]
async fn test_client_without_credential_is_skipped() {
    let config = Config::from_toml_str(TWO_CLIENTS).unwrap();
    let server = build_server_with(&config, no_secrets).await.unwrap();

    assert_eq!(tool_names(&server), vec!["server_health", "wiki_search_pages"]);
    assert!(server.resource_uri_templates().is_empty());
}

#[tokio::test]
async fn test_empty_credential_counts_as_missing() {
    let config = Config::from_toml_str(TWO_CLIENTS).unwrap();
    let server = build_server_with(&config, |_| Some(String::new()))
        .await
        .unwrap();
    assert!(!server.has_tool("tracker_list_issues"));
}

#[tokio::test]
async fn test_discovery_section_applies_to_every_client() {
    let raw = format!(
        "{TWO_CLIENTS}\n[discovery]\ninclude_mutating = false\nexclude = [\"wiki_search_pages\"]\n"
    );
    let config = Config::from_toml_str(&raw).unwrap();
    let server = build_server_with(&config, with_token).await.unwrap();

    assert_eq!(
        tool_names(&server),
        vec!["server_health", "tracker_list_issues"]
    );
}

#[tokio::test]
async fn test_invalid_tool_aborts_startup() {
    let raw = r#"
        [[clients]]
        prefix = "broken"
        name = "Broken"
        base_url = "http://127.0.0.1:9"

        [[clients.tools]]
        title = "Get Thing"
        summary = "Fetch a thing."
        path = "/things/{id}"
    "#;
    let config = Config::from_toml_str(raw).unwrap();
    let err = build_server_with(&config, no_secrets).await.unwrap_err();
    assert!(matches!(err, Error::Rest(_) | Error::Mcp(_)));
}

#[tokio::test]
async fn test_no_config_serves_health_only() {
    let server = build_server_with(&Config::default(), no_secrets)
        .await
        .unwrap();
    assert_eq!(tool_names(&server), vec!["server_health"]);

    let listing = render_tools(&server.tool_summaries(), false).unwrap();
    assert!(listing.contains("server_health"));
    assert!(listing.contains("read-only"));
}
