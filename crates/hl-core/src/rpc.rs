//! RPC protocol between the manager and a daemon
//!
//! Uses newline-delimited JSON messages over TCP. The manager only needs the
//! liveness call and the remote shutdown call.

use serde::{Deserialize, Serialize};

use crate::error::RpcError;

/// Request from the manager to a daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RpcRequest {
    /// Liveness check
    Ping,

    /// Ask the daemon to exit
    Shutdown,
}

/// Response from a daemon to the manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RpcResponse {
    /// Pong response
    Pong,

    /// Generic success
    Ok,

    /// Error response
    Error { message: String },
}

impl RpcRequest {
    /// Encode as a single JSON line (including the trailing newline)
    pub fn to_line(&self) -> Result<String, RpcError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl RpcResponse {
    /// Decode one JSON line
    pub fn from_line(line: &str) -> Result<Self, RpcError> {
        Ok(serde_json::from_str(line.trim())?)
    }
}
