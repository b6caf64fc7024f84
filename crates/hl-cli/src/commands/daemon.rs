//! Daemon start/stop command

use anyhow::Result;

use hl_manager::DaemonOutcome;

use super::parse_address;
use crate::context::ManagerContext;
use crate::output::{print_error, print_info, print_success, print_warning};

/// Stop a running daemon or start an offline local one.
///
/// Without an address the local daemon on the configured port is used.
pub async fn daemon_command(ctx: &ManagerContext, address: Option<&str>) -> Result<()> {
    let address = match address {
        Some(input) => parse_address(input)?,
        None => ctx.preferences.config().local_daemon_address(),
    };

    // Decisions use the cached status, so bring it up to date first
    ctx.registry.refresh_host(&address).await;

    match ctx.registry.start_or_stop_daemon(&address).await {
        Ok(DaemonOutcome::Started(address)) => {
            print_success(&format!("Started daemon for {}", address));
        }
        Ok(DaemonOutcome::Stopped(address)) => {
            print_success(&format!("Asked daemon at {} to shut down", address.uri()));
        }
        Ok(DaemonOutcome::Unavailable(address)) => {
            print_warning(&format!(
                "{} is offline and remote; its daemon can't be started from here",
                address
            ));
        }
        Err(e) => {
            print_error(&format!("Daemon operation failed: {}", e));
            print_info("Run 'hostlink list' to see configured hosts");
            return Err(e.into());
        }
    }

    Ok(())
}
