//! RPC client for talking to a daemon
//!
//! One request per line, one response per line. The connection is opened
//! lazily on the first request and reused for later ones.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use hl_core::error::RpcError;
use hl_core::rpc::{RpcRequest, RpcResponse};
use hl_core::HostAddress;

/// Upper bound on connect plus one request/response exchange
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one daemon endpoint
pub struct DaemonClient {
    address: HostAddress,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl DaemonClient {
    /// Create a client for `address` with the default timeout
    pub fn new(address: HostAddress) -> Self {
        Self {
            address,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            stream: None,
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the address
    pub fn address(&self) -> &HostAddress {
        &self.address
    }

    /// Invoke the liveness call. `Ok(false)` means the daemon answered with
    /// something other than a pong.
    pub async fn ping(&mut self) -> Result<bool, RpcError> {
        match self.send_request(RpcRequest::Ping).await? {
            RpcResponse::Pong => Ok(true),
            other => {
                tracing::debug!("Unexpected ping response from {}: {:?}", self.address, other);
                Ok(false)
            }
        }
    }

    /// Ask the daemon to exit
    pub async fn shutdown(&mut self) -> Result<(), RpcError> {
        match self.send_request(RpcRequest::Shutdown).await {
            Ok(RpcResponse::Ok) => Ok(()),
            // A daemon may exit before answering
            Err(RpcError::Closed) => {
                tracing::debug!("{} closed the connection during shutdown", self.address);
                Ok(())
            }
            Ok(RpcResponse::Error { message }) => Err(RpcError::Remote(message)),
            Ok(other) => Err(RpcError::Unexpected(format!("{:?}", other))),
            Err(e) => Err(e),
        }
    }

    /// Send a request and receive the response, bounded by the timeout
    async fn send_request(&mut self, request: RpcRequest) -> Result<RpcResponse, RpcError> {
        let timeout = self.timeout;
        match tokio::time::timeout(timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => {
                self.stream = None;
                Err(RpcError::Timeout(timeout))
            }
        }
    }

    async fn exchange(&mut self, request: RpcRequest) -> Result<RpcResponse, RpcError> {
        if self.stream.is_none() {
            let target = self.address.dial_target();
            tracing::trace!("Connecting to daemon at {}", target);
            self.stream = Some(TcpStream::connect(&target).await?);
        }
        let stream = self.stream.as_mut().ok_or(RpcError::Closed)?;

        // Send request as JSON line
        stream.write_all(request.to_line()?.as_bytes()).await?;

        // Read response line
        let mut reader = BufReader::new(stream);
        let mut response_line = String::new();
        let read = reader.read_line(&mut response_line).await?;
        drop(reader);
        if read == 0 {
            self.stream = None;
            return Err(RpcError::Closed);
        }

        RpcResponse::from_line(&response_line)
    }
}
