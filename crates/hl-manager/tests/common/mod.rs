//! Mock collaborators shared by the registry integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use hl_core::config::{BackoffConfig, ReadinessConfig};
use hl_core::error::{LaunchError, RpcError};
use hl_core::traits::{DaemonControl, DaemonLauncher, StatusProbe};
use hl_core::HostAddress;
use hl_manager::{
    Collaborators, ConnectionState, HostRegistry, InMemoryHostListStore, RegistrySettings,
};

/// Probe answering from a set of reachable addresses
#[derive(Default)]
pub struct MockProbe {
    reachable: Mutex<HashSet<HostAddress>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProbe {
    pub fn set_reachable(&self, address: &HostAddress, reachable: bool) {
        let mut set = self.reachable.lock().unwrap();
        if reachable {
            set.insert(address.clone());
        } else {
            set.remove(address);
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusProbe for MockProbe {
    async fn ping(&self, address: &HostAddress) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.reachable.lock().unwrap().contains(address)
    }
}

/// Launcher recording ports; optionally brings the daemon "up" on the probe
pub struct MockLauncher {
    started: Mutex<Vec<u16>>,
    probe: Arc<MockProbe>,
    boots: AtomicBool,
}

impl MockLauncher {
    pub fn new(probe: Arc<MockProbe>) -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            probe,
            boots: AtomicBool::new(true),
        }
    }

    /// Spawned daemons never answer
    pub fn never_boot(&self) {
        self.boots.store(false, Ordering::SeqCst);
    }

    pub fn started(&self) -> Vec<u16> {
        self.started.lock().unwrap().clone()
    }
}

impl DaemonLauncher for MockLauncher {
    fn start(&self, port: u16) -> Result<(), LaunchError> {
        self.started.lock().unwrap().push(port);
        if self.boots.load(Ordering::SeqCst) {
            self.probe.set_reachable(&HostAddress::localhost(port), true);
            let loopback = HostAddress::new("127.0.0.1", port).unwrap();
            self.probe.set_reachable(&loopback, true);
        }
        Ok(())
    }
}

/// Control recording shutdown targets
#[derive(Default)]
pub struct MockControl {
    shutdowns: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockControl {
    pub fn fail_with_error(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// URIs shutdown was sent to
    pub fn shutdowns(&self) -> Vec<String> {
        self.shutdowns.lock().unwrap().clone()
    }
}

#[async_trait]
impl DaemonControl for MockControl {
    async fn shutdown(&self, address: &HostAddress) -> Result<(), RpcError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RpcError::Remote("refused".to_string()));
        }
        self.shutdowns.lock().unwrap().push(address.uri());
        Ok(())
    }
}

/// A registry wired to mocks, with handles to inspect them
pub struct Harness {
    pub registry: Arc<HostRegistry>,
    pub probe: Arc<MockProbe>,
    pub launcher: Arc<MockLauncher>,
    pub control: Arc<MockControl>,
    pub store: Arc<InMemoryHostListStore>,
}

pub fn fast_settings() -> RegistrySettings {
    RegistrySettings {
        probe_timeout: Duration::from_millis(200),
        max_concurrent_probes: 4,
        readiness: ReadinessConfig {
            timeout: Duration::from_secs(1),
            backoff: BackoffConfig::default(),
        },
        ..RegistrySettings::default()
    }
}

pub fn harness(hosts: &[&str]) -> Harness {
    harness_with(hosts, fast_settings())
}

pub fn harness_with(hosts: &[&str], settings: RegistrySettings) -> Harness {
    let probe = Arc::new(MockProbe::default());
    let launcher = Arc::new(MockLauncher::new(Arc::clone(&probe)));
    let control = Arc::new(MockControl::default());
    let store = Arc::new(InMemoryHostListStore::with_hosts(hosts.iter().copied()));

    let collaborators = Collaborators {
        probe: probe.clone(),
        launcher: launcher.clone(),
        control: control.clone(),
        store: store.clone(),
    };
    let registry = HostRegistry::load(collaborators, settings, ConnectionState::new())
        .expect("in-memory store never fails");

    Harness {
        registry: Arc::new(registry),
        probe,
        launcher,
        control,
        store,
    }
}

pub fn addr(s: &str) -> HostAddress {
    s.parse().unwrap()
}
