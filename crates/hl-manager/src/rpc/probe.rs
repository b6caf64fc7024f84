//! Probe and control adapters over [`DaemonClient`]

use std::time::Duration;

use async_trait::async_trait;

use hl_core::error::RpcError;
use hl_core::traits::{DaemonControl, StatusProbe};
use hl_core::HostAddress;

use super::client::{DaemonClient, DEFAULT_REQUEST_TIMEOUT};

/// Liveness probe using the daemon's ping call
#[derive(Debug, Clone)]
pub struct RpcStatusProbe {
    request_timeout: Duration,
}

impl RpcStatusProbe {
    /// Create a probe whose requests give up after `request_timeout`
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl Default for RpcStatusProbe {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl StatusProbe for RpcStatusProbe {
    async fn ping(&self, address: &HostAddress) -> bool {
        let mut client = DaemonClient::new(address.clone()).with_timeout(self.request_timeout);
        match client.ping().await {
            Ok(reachable) => reachable,
            Err(e) => {
                tracing::trace!("{} unreachable: {}", address, e);
                false
            }
        }
    }
}

/// Remote shutdown using the daemon's shutdown call
#[derive(Debug, Clone)]
pub struct RpcDaemonControl {
    request_timeout: Duration,
}

impl RpcDaemonControl {
    /// Create a controller whose requests give up after `request_timeout`
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl Default for RpcDaemonControl {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl DaemonControl for RpcDaemonControl {
    async fn shutdown(&self, address: &HostAddress) -> Result<(), RpcError> {
        DaemonClient::new(address.clone())
            .with_timeout(self.request_timeout)
            .shutdown()
            .await
    }
}
