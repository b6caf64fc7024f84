//! CLI command implementations

mod config;
mod connect;
mod daemon;
mod hosts;
mod watch;

pub use config::{config_get, config_path, config_set, config_show};
pub use connect::{connect_command, disconnect_command};
pub use daemon::daemon_command;
pub use hosts::{add_command, list_command, remove_command};
pub use watch::watch_command;

use anyhow::{Context, Result};
use hl_core::HostAddress;

/// Parse a `host:port` or `http://host:port` argument
fn parse_address(input: &str) -> Result<HostAddress> {
    input
        .parse::<HostAddress>()
        .with_context(|| format!("Invalid host address {:?} (expected host:port)", input))
}
