//! Configuration management for hostlink

mod hostlist;
mod manager;
pub mod serde_utils;

pub use hostlist::HostListFile;
pub use manager::{BackoffConfig, DaemonConfig, ManagerConfig, ReadinessConfig};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Name of the manager configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the persisted host list file
pub const HOSTLIST_FILE_NAME: &str = "hostlist.toml";

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hostlink")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

/// Get the default host list path
pub fn default_hostlist_path() -> PathBuf {
    default_config_dir().join(HOSTLIST_FILE_NAME)
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration, falling back to defaults when the file is missing
pub fn load_config_or_default<T>(path: &Path) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match load_config(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let result: Result<ManagerConfig, _> = load_config(&path);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let config: ManagerConfig =
            load_config_or_default(&dir.path().join("config.toml")).unwrap();
        assert!(!config.autoconnect);
        assert!(config.show_connection_manager_on_start);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ManagerConfig::default();
        config.classic_mode = true;
        save_config(&path, &config).unwrap();

        let loaded: ManagerConfig = load_config(&path).unwrap();
        assert!(loaded.classic_mode);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "autoconnect = [").unwrap();
        let result: Result<ManagerConfig, _> = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
