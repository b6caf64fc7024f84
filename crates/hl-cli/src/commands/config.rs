//! Config command implementations

use anyhow::{Context, Result};

use hl_core::config::ManagerConfig;

use crate::context::ConfigPaths;
use crate::output::{print_error, print_info, print_success};

/// Show the effective configuration
pub fn config_show(paths: &ConfigPaths) -> Result<()> {
    let path = paths.config_file();

    if path.exists() {
        print_info(&format!("Configuration file: {:?}", path));
    } else {
        print_info(&format!("No configuration file at {:?}, showing defaults", path));
    }
    println!();

    let config: ManagerConfig = hl_core::config::load_config_or_default(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}

/// Print the config directory
pub fn config_path(paths: &ConfigPaths) -> Result<()> {
    println!("{}", paths.dir().display());
    Ok(())
}

/// Get a config value by dotted key
pub fn config_get(paths: &ConfigPaths, key: &str) -> Result<()> {
    let path = paths.config_file();
    let config: ManagerConfig = hl_core::config::load_config_or_default(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    let root = toml::Value::try_from(&config)?;

    let mut current = &root;
    for part in key.split('.') {
        match current.as_table().and_then(|t| t.get(part)) {
            Some(value) => current = value,
            None => {
                print_error(&format!("Key not found: {}", key));
                anyhow::bail!("Unknown config key: {}", key);
            }
        }
    }

    match current {
        toml::Value::String(s) => println!("{}", s),
        toml::Value::Table(_) => println!("{}", toml::to_string_pretty(current)?),
        other => println!("{}", other),
    }

    Ok(())
}

/// Set a config value by dotted key (e.g. `readiness.timeout_ms`).
///
/// The edited file must still parse and validate as a configuration before
/// it is written back.
pub fn config_set(paths: &ConfigPaths, key: &str, value: &str) -> Result<()> {
    let path = paths.config_file();

    let mut table: toml::Table = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        toml::Table::new()
    };

    let parts: Vec<&str> = key.split('.').collect();
    let (last_key, parents) = parts
        .split_last()
        .filter(|(last, _)| !last.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Invalid key: key path cannot be empty"))?;

    // Navigate/create path to the parent
    let mut current = &mut table;
    for part in parents {
        current = current
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("Cannot navigate to key: {}", key))?;
    }

    current.insert(last_key.to_string(), parse_value(value));

    let new_content = toml::to_string_pretty(&table)?;
    let checked = toml::from_str::<ManagerConfig>(&new_content)
        .map_err(|e| e.to_string())
        .and_then(|config| config.validate().map_err(|e| e.to_string()));
    if let Err(e) = checked {
        print_error(&format!("Invalid value for {}: {}", key, e));
        anyhow::bail!("Rejected invalid value for {}", key);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    std::fs::write(&path, new_content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    print_success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// Interpret a command-line value as the most specific TOML type
fn parse_value(value: &str) -> toml::Value {
    if value == "true" {
        toml::Value::Boolean(true)
    } else if value == "false" {
        toml::Value::Boolean(false)
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(value.to_string())
    }
}
