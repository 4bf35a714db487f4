//! Handlers for `toolbridge config ...`.

use crate::cli::ConfigAction;
use crate::config::{Config, STARTER_CONFIG, default_config_path, resolve_config_path};
use std::path::PathBuf;
use toolbridge_core::{Error, Result};

/// Run a `config` subcommand.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => {
            println!("{}", config_value(config_path, &key)?);
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = init_config_file(file.as_deref(), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
    }
}

/// Print the resolved config file path.
pub fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `toolbridge config init` to create it)");
    }
    Ok(())
}

/// Look up a dotted key in the loaded configuration.
///
/// Array elements are addressed by index, e.g. `clients.0.base_url`.
pub fn config_value(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = Config::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Write the starter configuration and return where it went.
pub fn init_config_file(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    std::fs::write(&path, STARTER_CONFIG).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// Walk a dotted key through tables and arrays.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(value, |current, part| match current {
        toml::Value::Table(table) => table.get(part),
        toml::Value::Array(items) => items.get(part.parse::<usize>().ok()?),
        _ => None,
    })
}

/// Render a value for the terminal: bare strings, TOML for the rest.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}
