//! Shared fixtures for toolbridge-cli integration tests.

use std::path::PathBuf;
use tempfile::TempDir;

/// Two backends: one behind a bearer token, one open.
pub const TWO_CLIENTS: &str = r#"
[server]
name = "bridge-test"
instructions = "Use tracker tools for issues."

[[clients]]
prefix = "tracker"
name = "Tracker"
base_url = "http://127.0.0.1:9/api"
auth = { type = "bearer", token_env = "TRACKER_TOKEN" }
defaults = { project = "core" }

[[clients.tools]]
title = "List Issues"
summary = "List issues in a project."
path = "/projects/{project}/issues"
params = [{ name = "project" }]

[[clients.tools]]
title = "Close Issue"
summary = "Close an issue."
method = "POST"
path = "/issues/{id}/close"
params = [{ name = "id" }]

[[clients.resources]]
name = "issue"
path = "{id}"
endpoint = "/issues/{id}"

[[clients]]
prefix = "wiki"
name = "Wiki"
base_url = "http://127.0.0.1:9/wiki"

[[clients.tools]]
title = "Search Pages"
summary = "Full-text page search."
path = "/search"
params = [{ name = "q", description = "Query" }]
"#;

/// Credential lookup that knows only `TRACKER_TOKEN`.
pub fn with_token(var: &str) -> Option<String> {
    (var == "TRACKER_TOKEN").then(|| "secret".to_string())
}

/// Credential lookup with nothing set.
pub fn no_secrets(_var: &str) -> Option<String> {
    None
}

/// Write `content` as `config.toml` in a fresh temp dir.
pub fn config_file(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}
