//! Daemon collaborator traits

use async_trait::async_trait;

use crate::error::{LaunchError, RpcError};
use crate::types::HostAddress;

/// Reachability check against a host's RPC endpoint
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// Invoke the daemon's liveness call.
    ///
    /// Any connection-level failure counts as unreachable; implementations
    /// never return an error.
    async fn ping(&self, address: &HostAddress) -> bool;
}

/// Remote control calls on a running daemon
#[async_trait]
pub trait DaemonControl: Send + Sync {
    /// Ask the daemon at `address` to exit
    async fn shutdown(&self, address: &HostAddress) -> Result<(), RpcError>;
}

/// Spawns daemon processes on this machine
pub trait DaemonLauncher: Send + Sync {
    /// Spawn a daemon bound to `port`. Returns once the process is spawned,
    /// not once it is reachable.
    fn start(&self, port: u16) -> Result<(), LaunchError>;
}
