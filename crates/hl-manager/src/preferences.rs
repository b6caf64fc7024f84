//! Persisted connection preferences
//!
//! Wraps [`ManagerConfig`] with the toggles a front end exposes. Each setter
//! writes the file immediately.

use std::path::{Path, PathBuf};

use hl_core::config::{self, ManagerConfig};
use hl_core::error::ConfigError;

use crate::state::ConnectionState;

/// Manager configuration bound to its file
pub struct Preferences {
    path: PathBuf,
    config: ManagerConfig,
}

impl Preferences {
    /// Load from `path`, using defaults when the file doesn't exist yet
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = config::load_config_or_default(&path)?;
        Ok(Self { path, config })
    }

    /// Wrap an already loaded configuration
    pub fn new(path: impl Into<PathBuf>, config: ManagerConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// File backing these preferences
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Toggle autoconnect. A host connected right now becomes the remembered one.
    pub fn set_autoconnect(
        &mut self,
        enabled: bool,
        connection: &ConnectionState,
    ) -> Result<(), ConfigError> {
        self.config.autoconnect = enabled;
        if let Some(current) = connection.current() {
            self.config.autoconnect_host_uri = Some(current.uri());
        }
        self.save()
    }

    /// Toggle starting an offline local daemon during autoconnect
    pub fn set_autostart_localhost(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.config.autostart_localhost = enabled;
        self.save()
    }

    /// Toggle showing the host list on startup
    pub fn set_show_on_start(&mut self, show: bool) -> Result<(), ConfigError> {
        self.config.show_connection_manager_on_start = show;
        self.save()
    }

    /// Remember the current connection target for the next autoconnect.
    ///
    /// Only applies when autoconnect is enabled. Returns whether the
    /// remembered host changed.
    pub fn remember_connected(&mut self, connection: &ConnectionState) -> Result<bool, ConfigError> {
        if !self.config.autoconnect {
            return Ok(false);
        }
        let Some(current) = connection.current() else {
            return Ok(false);
        };

        let uri = current.uri();
        if self.config.autoconnect_host_uri.as_deref() == Some(uri.as_str()) {
            return Ok(false);
        }

        tracing::debug!("Remembering {} for autoconnect", uri);
        self.config.autoconnect_host_uri = Some(uri);
        self.save()?;
        Ok(true)
    }

    /// Drop the remembered host. Returns whether one was set.
    pub fn forget_remembered(&mut self) -> Result<bool, ConfigError> {
        if self.config.autoconnect_host_uri.take().is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<(), ConfigError> {
        config::save_config(&self.path, &self.config)
    }
}
