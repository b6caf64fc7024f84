//! Connection manager configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_millis;
use crate::error::ConfigError;
use crate::types::{HostAddress, DEFAULT_DAEMON_PORT};

/// Configuration for the connection manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Reconnect to the remembered host on startup
    pub autoconnect: bool,

    /// Host remembered for autoconnect (`http://host:port` or `host:port`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoconnect_host_uri: Option<String>,

    /// Start the daemon when the remembered host is local and offline
    pub autostart_localhost: bool,

    /// Always run and connect to a local daemon
    pub classic_mode: bool,

    /// Whether a front end should show the host list on startup
    pub show_connection_manager_on_start: bool,

    /// Interval between status refresh ticks
    #[serde(rename = "refresh_interval_ms", with = "duration_millis")]
    pub refresh_interval: Duration,

    /// Upper bound on a single liveness probe
    #[serde(rename = "probe_timeout_ms", with = "duration_millis")]
    pub probe_timeout: Duration,

    /// Maximum number of probes in flight during one refresh
    pub max_concurrent_probes: usize,

    /// Local daemon launch settings
    pub daemon: DaemonConfig,

    /// Wait-for-daemon settings
    pub readiness: ReadinessConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            autoconnect: false,
            autoconnect_host_uri: None,
            autostart_localhost: false,
            classic_mode: false,
            show_connection_manager_on_start: true,
            refresh_interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(2),
            max_concurrent_probes: 8,
            daemon: DaemonConfig::default(),
            readiness: ReadinessConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Address of the local daemon used by classic mode
    pub fn local_daemon_address(&self) -> HostAddress {
        HostAddress::localhost(self.daemon.default_port)
    }

    /// Reject values that parse but can't drive the refresh loop or backoff
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "refresh_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent_probes == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_probes must be at least 1".to_string(),
            ));
        }
        self.readiness.backoff.validate()
    }
}

/// How to spawn a local daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Daemon executable (looked up on PATH when not absolute)
    pub program: String,

    /// Flag preceding the port argument
    pub port_flag: String,

    /// Port for the default local host entry
    pub default_port: u16,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            program: "hostlinkd".to_string(),
            port_flag: "-p".to_string(),
            default_port: DEFAULT_DAEMON_PORT,
        }
    }
}

/// How long and how often to poll a freshly started daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Give up after this long
    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,

    /// Delay between polls
    pub backoff: BackoffConfig,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(rename = "initial_ms", with = "duration_millis")]
    pub initial: Duration,

    /// Maximum delay
    #[serde(rename = "max_ms", with = "duration_millis")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(10),
            max: Duration::from_millis(500),
            multiplier: 2.0,
            jitter: 0.0,
        }
    }
}

impl BackoffConfig {
    /// Check that delays grow from a non-zero start and stay finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial.is_zero() {
            return Err(ConfigError::Invalid(
                "readiness.backoff.initial_ms must be greater than 0".to_string(),
            ));
        }
        if self.max < self.initial {
            return Err(ConfigError::Invalid(
                "readiness.backoff.max_ms must not be below initial_ms".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "readiness.backoff.multiplier must be a finite number >= 1.0, got {}",
                self.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::Invalid(format!(
                "readiness.backoff.jitter must be between 0.0 and 1.0, got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}
