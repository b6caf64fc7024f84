//! Startup connection policy
//!
//! Classic mode always runs a local daemon and connects to it. Otherwise, with
//! autoconnect enabled, the remembered host is probed and connected; when it is
//! an offline local host and autostart is enabled, it is listed, started,
//! waited on and then connected. Classic mode takes precedence.

use hl_core::config::ManagerConfig;
use hl_core::error::ConnectError;
use hl_core::HostAddress;

use crate::registry::HostRegistry;

/// What the startup policy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    /// Classic mode: connected to the local daemon
    Classic(HostAddress),
    /// Remembered host was online and is now connected
    AutoConnected(HostAddress),
    /// Remembered local host was started and is now connected
    AutoStarted(HostAddress),
    /// Remembered host is offline and could not be started
    Unreachable(HostAddress),
    /// No startup connection requested
    Idle,
}

impl StartupOutcome {
    /// Connected address, if the policy connected anywhere
    pub fn connected(&self) -> Option<&HostAddress> {
        match self {
            StartupOutcome::Classic(addr)
            | StartupOutcome::AutoConnected(addr)
            | StartupOutcome::AutoStarted(addr) => Some(addr),
            StartupOutcome::Unreachable(_) | StartupOutcome::Idle => None,
        }
    }
}

/// Apply the startup policy from `config` to `registry`
pub async fn run_startup(
    registry: &HostRegistry,
    config: &ManagerConfig,
) -> Result<StartupOutcome, ConnectError> {
    if config.classic_mode {
        let address = config.local_daemon_address();
        tracing::info!("Classic mode: using local daemon at {}", address);

        // A daemon already answering on the port is reused; a second one
        // could not bind it
        if !registry.probe_once(&address).await {
            registry.start_daemon_and_wait(&address).await?;
        }
        registry.establish(&address);
        return Ok(StartupOutcome::Classic(address));
    }

    if !config.autoconnect {
        return Ok(StartupOutcome::Idle);
    }

    let Some(uri) = config.autoconnect_host_uri.as_deref() else {
        return Ok(StartupOutcome::Idle);
    };

    let address = match uri.parse::<HostAddress>() {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!("Ignoring remembered host {:?}: {}", uri, e);
            return Ok(StartupOutcome::Idle);
        }
    };

    if registry.probe_once(&address).await {
        registry.establish(&address);
        return Ok(StartupOutcome::AutoConnected(address));
    }

    if config.autostart_localhost && address.is_local() {
        tracing::info!("Remembered host {} is offline, starting it", address);
        if let Err(e) = registry.add_host(address.host(), address.port()).await {
            tracing::warn!("Failed to list {}: {}", address, e);
        }
        registry.start_daemon_and_wait(&address).await?;
        registry.establish(&address);
        return Ok(StartupOutcome::AutoStarted(address));
    }

    tracing::warn!("Remembered host {} is not online", address);
    Ok(StartupOutcome::Unreachable(address))
}
