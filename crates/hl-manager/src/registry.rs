//! Host registry
//!
//! The `HostRegistry` owns the ordered list of known daemon hosts, the last
//! observed status of each, and the shared [`ConnectionState`]. It drives the
//! connect/disconnect and daemon start/stop transitions through the
//! collaborator traits from `hl_core::traits`.
//!
//! # Locking
//!
//! The ordered address list sits behind a `std::sync::RwLock` and the status
//! cache is a `DashMap`. Neither is ever held across an `.await`, so probes,
//! remote calls and readiness waits run without blocking other callers.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hl_core::config::{ManagerConfig, ReadinessConfig};
use hl_core::error::{ConfigError, ConnectError, DaemonControlError, RegistryError};
use hl_core::traits::{DaemonControl, DaemonLauncher, HostListStore, StatusProbe};
use hl_core::{HostActions, HostAddress, HostEntry, HostStatus, DEFAULT_DAEMON_PORT};

use crate::readiness::{wait_until_ready, ReadinessError};
use crate::state::ConnectionState;

/// External collaborators the registry drives
#[derive(Clone)]
pub struct Collaborators {
    /// Liveness checks
    pub probe: Arc<dyn StatusProbe>,
    /// Local daemon spawning
    pub launcher: Arc<dyn DaemonLauncher>,
    /// Remote shutdown
    pub control: Arc<dyn DaemonControl>,
    /// Host list persistence
    pub store: Arc<dyn HostListStore>,
}

/// Tunables for probing and readiness waits
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Upper bound on one liveness probe
    pub probe_timeout: Duration,
    /// Probes in flight during one refresh
    pub max_concurrent_probes: usize,
    /// Port of the default local host entry
    pub default_port: u16,
    /// Wait-for-daemon settings
    pub readiness: ReadinessConfig,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(2),
            max_concurrent_probes: 8,
            default_port: DEFAULT_DAEMON_PORT,
            readiness: ReadinessConfig::default(),
        }
    }
}

impl From<&ManagerConfig> for RegistrySettings {
    fn from(config: &ManagerConfig) -> Self {
        Self {
            probe_timeout: config.probe_timeout,
            max_concurrent_probes: config.max_concurrent_probes,
            default_port: config.daemon.default_port,
            readiness: config.readiness.clone(),
        }
    }
}

/// Result of [`HostRegistry::add_host`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddHostOutcome {
    /// New entry appended
    Added(HostAddress),
    /// Entry already present; nothing changed
    AlreadyPresent(HostAddress),
}

impl AddHostOutcome {
    /// The address that was added or already present
    pub fn address(&self) -> &HostAddress {
        match self {
            AddHostOutcome::Added(addr) | AddHostOutcome::AlreadyPresent(addr) => addr,
        }
    }
}

/// Result of [`HostRegistry::connect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Host is now the connection target
    Connected(HostAddress),
    /// Host was already the target, so it was disconnected instead
    Disconnected(HostAddress),
}

/// Result of [`HostRegistry::start_or_stop_daemon`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonOutcome {
    /// A local daemon was spawned
    Started(HostAddress),
    /// A running daemon was asked to shut down
    Stopped(HostAddress),
    /// Offline remote host; nothing can be done from here
    Unavailable(HostAddress),
}

/// Ordered set of known hosts with their status and the connection target
pub struct HostRegistry {
    /// Addresses in display order
    hosts: RwLock<Vec<HostAddress>>,
    /// Raw probe results (`Online`/`Offline`) per address
    statuses: DashMap<HostAddress, HostStatus>,
    /// Current connection target
    connection: ConnectionState,
    collaborators: Collaborators,
    settings: RegistrySettings,
    /// Cancels readiness waits on shutdown
    cancel: CancellationToken,
}

impl HostRegistry {
    /// Create an empty registry
    pub fn new(
        collaborators: Collaborators,
        settings: RegistrySettings,
        connection: ConnectionState,
    ) -> Self {
        Self {
            hosts: RwLock::new(Vec::new()),
            statuses: DashMap::new(),
            connection,
            collaborators,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a registry populated from the persisted host list.
    ///
    /// Entries that don't parse are skipped; duplicates collapse into one.
    pub fn load(
        collaborators: Collaborators,
        settings: RegistrySettings,
        connection: ConnectionState,
    ) -> Result<Self, ConfigError> {
        let persisted = collaborators.store.load()?;
        let registry = Self::new(collaborators, settings, connection);

        for entry in persisted {
            match entry.parse::<HostAddress>() {
                Ok(address) => {
                    registry.insert(address);
                }
                Err(e) => tracing::warn!("Skipping host list entry {:?}: {}", entry, e),
            }
        }

        tracing::debug!("Loaded {} hosts", registry.len());
        Ok(registry)
    }

    fn read_hosts(&self) -> RwLockReadGuard<'_, Vec<HostAddress>> {
        self.hosts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_hosts(&self) -> RwLockWriteGuard<'_, Vec<HostAddress>> {
        self.hosts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `address` as `Offline` unless present. Returns whether it was added.
    fn insert(&self, address: HostAddress) -> bool {
        let mut hosts = self.write_hosts();
        if hosts.contains(&address) {
            return false;
        }
        self.statuses.insert(address.clone(), HostStatus::Offline);
        hosts.push(address);
        true
    }

    /// Write the current list back through the store
    fn persist(&self) {
        let hosts: Vec<String> = self.addresses().iter().map(ToString::to_string).collect();
        if let Err(e) = self.collaborators.store.save(&hosts) {
            tracing::warn!("Failed to save host list: {}", e);
        }
    }

    /// Shared connection state handle
    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// Probe and readiness settings
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Addresses in display order
    pub fn addresses(&self) -> Vec<HostAddress> {
        self.read_hosts().clone()
    }

    /// Number of known hosts
    pub fn len(&self) -> usize {
        self.read_hosts().len()
    }

    /// Check if no hosts are known
    pub fn is_empty(&self) -> bool {
        self.read_hosts().is_empty()
    }

    /// Check if `address` is known
    pub fn contains(&self, address: &HostAddress) -> bool {
        self.read_hosts().contains(address)
    }

    /// Status shown for `address`: `Connected` when it is the connection
    /// target, otherwise the last probe result.
    pub fn status_of(&self, address: &HostAddress) -> Option<HostStatus> {
        let raw = *self.statuses.get(address)?;
        Some(self.effective_status(address, raw))
    }

    pub(crate) fn effective_status(&self, address: &HostAddress, raw: HostStatus) -> HostStatus {
        if self.connection.is_connected_to(address) {
            HostStatus::Connected
        } else {
            raw
        }
    }

    /// All hosts in display order with their effective status
    pub fn snapshot(&self) -> Vec<HostEntry> {
        self.read_hosts()
            .iter()
            .map(|address| HostEntry {
                address: address.clone(),
                status: self.status_of(address).unwrap_or(HostStatus::Offline),
            })
            .collect()
    }

    /// Actions available with `selected` highlighted.
    ///
    /// With no hosts at all only starting a local daemon is possible. Returns
    /// `None` when nothing (or an unknown host) is selected.
    pub fn actions_for(&self, selected: Option<&HostAddress>) -> Option<HostActions> {
        if self.is_empty() {
            return Some(HostActions::empty_registry());
        }
        let address = selected?;
        let status = self.status_of(address)?;
        Some(HostActions::for_host(address, status))
    }

    /// Store a probe result for `address`.
    ///
    /// Returns the effective status, or `None` if the host was removed while
    /// the probe was in flight (the result is dropped).
    pub(crate) fn record_probe(&self, address: &HostAddress, reachable: bool) -> Option<HostStatus> {
        let raw = HostStatus::from_reachable(reachable);
        {
            let mut entry = self.statuses.get_mut(address)?;
            *entry = raw;
        }
        Some(self.effective_status(address, raw))
    }

    /// Add `hostname:port` to the list.
    ///
    /// Any scheme prefix on `hostname` is stripped. A host that is already
    /// listed is left untouched. New hosts are persisted and probed right away.
    pub async fn add_host(
        &self,
        hostname: &str,
        port: u16,
    ) -> Result<AddHostOutcome, RegistryError> {
        let address = HostAddress::new(hostname, port)?;

        if !self.insert(address.clone()) {
            tracing::debug!("Host {} already listed", address);
            return Ok(AddHostOutcome::AlreadyPresent(address));
        }

        tracing::info!("Added host {}", address);
        self.persist();
        self.refresh_host(&address).await;

        Ok(AddHostOutcome::Added(address))
    }

    /// Remove `address` from the list, then persist and refresh the rest.
    ///
    /// Removing the connected host is allowed and leaves the connection
    /// target untouched.
    pub async fn remove_host(&self, address: &HostAddress) -> Result<(), RegistryError> {
        {
            let mut hosts = self.write_hosts();
            let index = hosts
                .iter()
                .position(|a| a == address)
                .ok_or_else(|| RegistryError::NotFound(address.clone()))?;
            hosts.remove(index);
            self.statuses.remove(address);
        }

        if self.connection.is_connected_to(address) {
            tracing::warn!("Removed {} while it is still the connection target", address);
        } else {
            tracing::info!("Removed host {}", address);
        }

        self.persist();
        self.refresh_all().await;
        Ok(())
    }

    /// Connect to `address`, or disconnect if it is already the target.
    ///
    /// An unreachable local host gets a daemon spawned and is waited on
    /// (bounded by the readiness timeout). An unreachable remote host fails
    /// with [`ConnectError::HostUnreachable`] and leaves the connection
    /// state unchanged.
    pub async fn connect(&self, address: &HostAddress) -> Result<ConnectOutcome, ConnectError> {
        if self.connection.is_connected_to(address) {
            self.disconnect();
            return Ok(ConnectOutcome::Disconnected(address.clone()));
        }

        // Probe fresh rather than trusting the cache, which may be a tick old
        let reachable = self.probe_once(address).await;
        self.record_probe(address, reachable);

        if !reachable {
            if !address.is_local() {
                tracing::warn!("Host {} does not appear to be online", address);
                return Err(ConnectError::HostUnreachable(address.clone()));
            }

            tracing::info!("Local host {} is offline, starting daemon", address);
            self.start_daemon_and_wait(address).await?;
        }

        self.establish(address);
        Ok(ConnectOutcome::Connected(address.clone()))
    }

    /// Run [`connect`](Self::connect) on its own task so a readiness wait
    /// never stalls the caller's refresh loop.
    pub fn spawn_connect(
        self: &Arc<Self>,
        address: HostAddress,
    ) -> JoinHandle<Result<ConnectOutcome, ConnectError>> {
        let registry = Arc::clone(self);
        tokio::spawn(async move { registry.connect(&address).await })
    }

    /// Drop the connection target. Always succeeds.
    pub fn disconnect(&self) {
        if let Some(previous) = self.connection.clear() {
            tracing::info!("Disconnected from {}", previous);
        }
    }

    /// Make `address` the connection target
    pub(crate) fn establish(&self, address: &HostAddress) {
        self.record_probe(address, true);
        if let Some(previous) = self.connection.set(address.clone()) {
            if &previous != address {
                tracing::debug!("Switching connection from {}", previous);
            }
        }
        tracing::info!("Connected to {}", address.uri());
    }

    /// Spawn a local daemon for `address` and wait until it answers
    pub(crate) async fn start_daemon_and_wait(
        &self,
        address: &HostAddress,
    ) -> Result<(), ConnectError> {
        self.collaborators.launcher.start(address.port())?;

        let readiness = &self.settings.readiness;
        match wait_until_ready(|| self.probe_once(address), readiness, &self.cancel).await {
            Ok(attempts) => {
                tracing::debug!("Daemon at {} answered after {} polls", address, attempts);
                self.record_probe(address, true);
                Ok(())
            }
            Err(ReadinessError::TimedOut(waited)) => Err(ConnectError::StartupTimeout {
                address: address.clone(),
                waited,
            }),
            Err(ReadinessError::Cancelled) => Err(ConnectError::Cancelled(address.clone())),
        }
    }

    /// Stop a running daemon or start an offline local one.
    ///
    /// With an empty list, `localhost` on the default port is added and its
    /// daemon started; `address` is ignored in that case. Decisions use the
    /// cached status.
    pub async fn start_or_stop_daemon(
        &self,
        address: &HostAddress,
    ) -> Result<DaemonOutcome, DaemonControlError> {
        if self.is_empty() {
            let local = HostAddress::localhost(self.settings.default_port);
            if self.insert(local.clone()) {
                tracing::info!("Added host {}", local);
                self.persist();
                self.refresh_host(&local).await;
            }
            tracing::info!("Starting localhost:{} daemon", local.port());
            self.collaborators.launcher.start(local.port())?;
            return Ok(DaemonOutcome::Started(local));
        }

        let status = self
            .status_of(address)
            .ok_or_else(|| DaemonControlError::NotFound(address.clone()))?;

        if status.is_running() {
            tracing::info!("Shutting down daemon at {}", address.uri());
            self.collaborators
                .control
                .shutdown(address)
                .await
                .map_err(|e| DaemonControlError::Shutdown {
                    address: address.clone(),
                    reason: e.to_string(),
                })?;
            self.refresh_host(address).await;
            return Ok(DaemonOutcome::Stopped(address.clone()));
        }

        if address.is_local() {
            tracing::info!("Starting {} daemon", address);
            self.collaborators.launcher.start(address.port())?;
            return Ok(DaemonOutcome::Started(address.clone()));
        }

        tracing::debug!("Cannot start a daemon on remote host {}", address);
        Ok(DaemonOutcome::Unavailable(address.clone()))
    }

    /// Cancel in-flight readiness waits
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Token that fires when the registry shuts down
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn probe(&self) -> &Arc<dyn StatusProbe> {
        &self.collaborators.probe
    }
}
