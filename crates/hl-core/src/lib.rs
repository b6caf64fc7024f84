//! hl-core: Core abstractions and configuration for hostlink
//!
//! This crate provides the host model, error taxonomy, configuration
//! structures, RPC wire messages and the collaborator traits shared by the
//! manager and the CLI.

pub mod config;
pub mod error;
pub mod rpc;
pub mod traits;
pub mod types;

pub use error::HlError;
pub use types::{
    ConnectAction, DaemonAction, HostActions, HostAddress, HostEntry, HostStatus,
    DEFAULT_DAEMON_PORT,
};
