//! Current connection target

use std::sync::Arc;

use tokio::sync::watch;

use hl_core::HostAddress;

/// Which host, if any, the RPC client currently targets.
///
/// Cloning yields another handle to the same slot. Collaborators that route
/// RPC traffic can [`subscribe`](Self::subscribe) to follow changes.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    tx: Arc<watch::Sender<Option<HostAddress>>>,
}

impl ConnectionState {
    /// Create a state with nothing connected
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Current target
    pub fn current(&self) -> Option<HostAddress> {
        self.tx.borrow().clone()
    }

    /// Whether `address` is the current target
    pub fn is_connected_to(&self, address: &HostAddress) -> bool {
        self.tx.borrow().as_ref() == Some(address)
    }

    /// Whether any host is targeted
    pub fn is_connected(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Target `address`, returning the previous target
    pub fn set(&self, address: HostAddress) -> Option<HostAddress> {
        self.tx.send_replace(Some(address))
    }

    /// Drop the current target, returning it
    pub fn clear(&self) -> Option<HostAddress> {
        self.tx.send_replace(None)
    }

    /// Watch for target changes
    pub fn subscribe(&self) -> watch::Receiver<Option<HostAddress>> {
        self.tx.subscribe()
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}
