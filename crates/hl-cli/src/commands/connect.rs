//! Connect and disconnect commands

use anyhow::Result;

use hl_core::error::ConnectError;
use hl_manager::ConnectOutcome;

use super::parse_address;
use crate::context::ManagerContext;
use crate::output::{print_error, print_info, print_success, print_warning};

/// Connect to a host, starting a local daemon if needed
pub async fn connect_command(ctx: &mut ManagerContext, address: &str) -> Result<()> {
    let address = parse_address(address)?;

    if !ctx.registry.contains(&address) {
        print_warning(&format!("{} is not in the host list", address));
    }

    let joined = ctx.registry.spawn_connect(address.clone()).await;
    let result = joined.unwrap_or_else(|e| Err(ConnectError::Task(e.to_string())));

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            match &e {
                ConnectError::HostUnreachable(_) => {
                    print_error(&format!("Host {} does not appear to be online", address));
                }
                ConnectError::Launch(_) => {
                    print_error(&e.to_string());
                    print_info("Set 'daemon.program' with 'hostlink config set'");
                }
                _ => print_error(&format!("Failed to connect: {}", e)),
            }
            return Err(e.into());
        }
    };

    match outcome {
        ConnectOutcome::Connected(address) => {
            print_success(&format!("Connected to {}", address.uri()));
        }
        ConnectOutcome::Disconnected(address) => {
            print_info(&format!("Disconnected from {}", address));
        }
    }

    if ctx.preferences.remember_connected(ctx.registry.connection())? {
        print_info("Remembered for autoconnect");
    }

    Ok(())
}

/// Forget the remembered autoconnect host
pub fn disconnect_command(ctx: &mut ManagerContext) -> Result<()> {
    ctx.registry.disconnect();

    if ctx.preferences.forget_remembered()? {
        print_success("Forgot remembered host");
    } else {
        print_info("No remembered host");
    }
    Ok(())
}
