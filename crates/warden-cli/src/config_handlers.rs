//! Handler functions for the `warden config` subcommands.
//!
//! Keys are `<section>.<field>` pairs from [`WardenConfig`] (for example
//! `server.port` or `auth.token_ttl_minutes`). `set` only accepts keys the
//! configuration knows about, parses the value as that key's type, and
//! refuses to write a file that would no longer load.

use std::path::{Path, PathBuf};

use crate::cli::ConfigAction;
use crate::config::{PROJECT_NAME, WardenConfig};
use crate::{Error, Result};

/// Handle a config subcommand.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => {
            println!("{}", lookup(config_path, &key)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => cmd_config_set(config_path, &key, &value),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force),
        ConfigAction::Export => {
            for (key, value) in WardenConfig::load(config_path)?.to_env_vars()? {
                println!("{key}={value}");
            }
            Ok(())
        }
    }
}

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = config_file(config_path)?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `{PROJECT_NAME} config init` to create it)");
    }
    Ok(())
}

/// The effective value of `key`, after file, environment, and defaults.
pub fn lookup(config_path: Option<&str>, key: &str) -> Result<String> {
    let (section, field) = split_key(key)?;
    let settings = settings_table(&WardenConfig::load(config_path)?)?;
    setting(&settings, section, field)
        .map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .ok_or_else(|| unknown_key(key))
}

/// Write `key = value` into the config file.
pub fn cmd_config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<()> {
    let path = config_file(config_path)?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{PROJECT_NAME} config init` first.",
            path.display()
        )));
    }

    let (section, field) = split_key(key)?;
    let defaults = settings_table(&WardenConfig::default())?;
    let template = setting(&defaults, section, field).ok_or_else(|| unknown_key(key))?;
    let parsed = coerce(key, value, template)?;

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Table = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
    doc.entry(section.to_string())
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
        .as_table_mut()
        .ok_or_else(|| Error::config(format!("[{section}] in {} is not a table", path.display())))?
        .insert(field.to_string(), parsed);

    let rendered = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<WardenConfig>(&rendered)
        .map_err(|e| Error::config(format!("{key} = {value} is not a valid setting: {e}")))?;
    std::fs::write(&path, rendered).map_err(|e| Error::io_with_path(e, &path))?;

    println!("Set {key} = {value} in {}", path.display());
    Ok(())
}

/// Create a default configuration file.
pub fn cmd_config_init(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => WardenConfig::default_config_path()
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

    write_config(&path, &WardenConfig::default())?;
    println!("Config file created at {}", path.display());
    Ok(())
}

fn write_config(path: &Path, config: &WardenConfig) -> Result<()> {
    let rendered = config.to_toml_string()?;
    std::fs::write(path, rendered).map_err(|e| Error::io_with_path(e, path))
}

fn config_file(config_path: Option<&str>) -> Result<PathBuf> {
    WardenConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))
}

/// Split `section.field`; anything deeper or shallower is rejected.
fn split_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once('.') {
        Some((section, field))
            if !section.is_empty() && !field.is_empty() && !field.contains('.') =>
        {
            Ok((section, field))
        }
        _ => Err(Error::config(format!(
            "Invalid key '{key}': expected <section>.<field>, e.g. server.port"
        ))),
    }
}

fn settings_table(config: &WardenConfig) -> Result<toml::Table> {
    match toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))? {
        toml::Value::Table(table) => Ok(table),
        _ => Err(Error::config("configuration did not serialize to a table")),
    }
}

fn setting<'a>(settings: &'a toml::Table, section: &str, field: &str) -> Option<&'a toml::Value> {
    settings.get(section)?.as_table()?.get(field)
}

fn unknown_key(key: &str) -> Error {
    Error::config(format!("Key '{key}' not found in configuration"))
}

/// Parse `raw` as the same TOML type as `template`.
fn coerce(key: &str, raw: &str, template: &toml::Value) -> Result<toml::Value> {
    match template {
        toml::Value::Integer(_) => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|_| Error::config(format!("{key} expects an integer, got '{raw}'"))),
        toml::Value::Boolean(_) => raw
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .map_err(|_| Error::config(format!("{key} expects true or false, got '{raw}'"))),
        _ => Ok(toml::Value::String(raw.to_string())),
    }
}
