//! Core error types for hostlink

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::HostAddress;

/// Top-level error type for the hostlink ecosystem
#[derive(Error, Debug)]
pub enum HlError {
    /// Host address error
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Connect error
    #[error("Connect error: {0}")]
    Connect(#[from] ConnectError),

    /// Daemon control error
    #[error("Daemon control error: {0}")]
    DaemonControl(#[from] DaemonControlError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors building or parsing a host address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Hostname is empty once the scheme prefix is stripped
    #[error("Invalid hostname: {0:?}")]
    InvalidHostname(String),

    /// Address string is not `host:port`
    #[error("Invalid host address: {0:?}")]
    InvalidAddress(String),
}

/// Errors from host list mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Hostname is empty once the scheme prefix is stripped
    #[error("Invalid hostname: {0:?}")]
    InvalidHostname(String),

    /// Address is not in the host list
    #[error("Host not found: {0}")]
    NotFound(HostAddress),
}

impl From<HostError> for RegistryError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::InvalidHostname(name) | HostError::InvalidAddress(name) => {
                RegistryError::InvalidHostname(name)
            }
        }
    }
}

/// Errors from connecting to a host
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Remote host did not answer the liveness probe
    #[error("Host unreachable: {0}")]
    HostUnreachable(HostAddress),

    /// Local daemon could not be spawned
    #[error("Failed to start local daemon: {0}")]
    Launch(#[from] LaunchError),

    /// Local daemon was started but never became reachable
    #[error("Daemon at {address} did not become reachable within {waited:?}")]
    StartupTimeout {
        address: HostAddress,
        waited: Duration,
    },

    /// Wait was cancelled by shutdown
    #[error("Connect to {0} cancelled")]
    Cancelled(HostAddress),

    /// Background connect task failed to complete
    #[error("Connect task failed: {0}")]
    Task(String),
}

/// Errors from starting or stopping a daemon
#[derive(Error, Debug)]
pub enum DaemonControlError {
    /// Address is not in the host list
    #[error("Host not found: {0}")]
    NotFound(HostAddress),

    /// Remote shutdown call failed
    #[error("Shutdown of {address} failed: {reason}")]
    Shutdown {
        address: HostAddress,
        reason: String,
    },

    /// Local daemon could not be spawned
    #[error("Failed to start local daemon: {0}")]
    Launch(#[from] LaunchError),
}

/// Errors spawning a local daemon process
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Process spawn failed
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the daemon RPC transport
#[derive(Error, Debug)]
pub enum RpcError {
    /// Transport failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed message on the wire
    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    /// Request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection closed before a response arrived
    #[error("Connection closed by daemon")]
    Closed,

    /// Daemon answered with an error
    #[error("Daemon error: {0}")]
    Remote(String),

    /// Daemon answered with the wrong response kind
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
