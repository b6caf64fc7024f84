//! Per-invocation manager setup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use hl_core::config::{self, CONFIG_FILE_NAME, HOSTLIST_FILE_NAME};
use hl_manager::{Collaborators, ConnectionState, HostRegistry, Preferences, RegistrySettings};

/// Where the config and host list files live
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    /// Use `dir`, or the default config directory when not given
    pub fn resolve(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(config::default_config_dir),
        }
    }

    /// Config directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `config.toml`
    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// `hostlist.toml`
    pub fn hostlist_file(&self) -> PathBuf {
        self.dir.join(HOSTLIST_FILE_NAME)
    }
}

/// Loaded preferences plus a registry wired to the production adapters
pub struct ManagerContext {
    pub paths: ConfigPaths,
    pub preferences: Preferences,
    pub registry: Arc<HostRegistry>,
}

impl ManagerContext {
    /// Load preferences and the host list from `paths`
    pub fn open(paths: ConfigPaths) -> Result<Self> {
        let config_file = paths.config_file();
        let preferences = Preferences::load(&config_file)
            .with_context(|| format!("Failed to load config from {:?}", config_file))?;

        let config = preferences.config();
        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", config_file))?;
        let collaborators = Collaborators::from_config(config, &paths.hostlist_file());
        let registry = HostRegistry::load(
            collaborators,
            RegistrySettings::from(config),
            ConnectionState::new(),
        )
        .with_context(|| format!("Failed to load host list from {:?}", paths.hostlist_file()))?;

        tracing::debug!("Using config directory {:?}", paths.dir());

        Ok(Self {
            paths,
            preferences,
            registry: Arc::new(registry),
        })
    }
}
