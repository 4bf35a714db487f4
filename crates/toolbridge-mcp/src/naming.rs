//! Global naming of tools and resources.
//!
//! Every backend client has a unique prefix. Tool names are
//! `<prefix>_<slug>`, tool titles are `<client name>: <title>`, and
//! resource URIs are `<prefix>://<name>/<path>`. The prefix is the only
//! thing keeping two products' "List Projects" tools apart.

/// Lowercase `title` and collapse each run of whitespace into `_`.
///
/// Leading and trailing whitespace is dropped rather than turned into `_`,
/// so `" List Things "` becomes `list_things`.
pub fn slugify(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Process-wide tool name for a client-local name.
pub fn global_tool_name(prefix: &str, local_name: &str) -> String {
    format!("{prefix}_{local_name}")
}

/// Display title for a tool.
pub fn global_tool_title(client_name: &str, title: &str) -> String {
    format!("{client_name}: {title}")
}

/// URI template for a client resource.
pub fn resource_uri_template(prefix: &str, name: &str, path_template: &str) -> String {
    format!("{prefix}://{name}/{}", path_template.trim_start_matches('/'))
}
