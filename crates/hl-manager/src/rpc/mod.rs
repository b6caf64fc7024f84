//! Daemon RPC adapters
//!
//! Concrete [`StatusProbe`](hl_core::traits::StatusProbe) and
//! [`DaemonControl`](hl_core::traits::DaemonControl) implementations that
//! speak the JSON-line protocol from `hl_core::rpc` over TCP.

mod client;
mod probe;

pub use client::{DaemonClient, DEFAULT_REQUEST_TIMEOUT};
pub use probe::{RpcDaemonControl, RpcStatusProbe};
