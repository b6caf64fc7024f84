//! hl-manager: Connection manager for daemon hosts
//!
//! Tracks a list of daemon hosts, polls their reachability, reconciles the
//! polled status with the current connection target, and coordinates local
//! daemon start/stop and connect/disconnect. Transport, process spawning and
//! persistence are reached through the traits in `hl_core::traits`; concrete
//! adapters for each live in this crate.

pub mod launcher;
pub mod preferences;
pub mod readiness;
pub mod refresh;
pub mod registry;
pub mod rpc;
pub mod startup;
pub mod state;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use hl_core::config::ManagerConfig;

pub use launcher::ProcessLauncher;
pub use preferences::Preferences;
pub use refresh::{RefreshTimer, MIN_REFRESH_INTERVAL};
pub use registry::{
    AddHostOutcome, Collaborators, ConnectOutcome, DaemonOutcome, HostRegistry, RegistrySettings,
};
pub use rpc::{DaemonClient, RpcDaemonControl, RpcStatusProbe};
pub use startup::{run_startup, StartupOutcome};
pub use state::ConnectionState;
pub use store::{InMemoryHostListStore, TomlHostListStore};

impl Collaborators {
    /// Production adapters: RPC over TCP, process spawning, TOML host list
    pub fn from_config(config: &ManagerConfig, hostlist_path: &Path) -> Self {
        Self {
            probe: Arc::new(RpcStatusProbe::new(config.probe_timeout)),
            launcher: Arc::new(ProcessLauncher::from_config(&config.daemon)),
            control: Arc::new(RpcDaemonControl::default()),
            store: Arc::new(TomlHostListStore::new(hostlist_path)),
        }
    }
}
