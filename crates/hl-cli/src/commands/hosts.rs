//! Host list commands

use anyhow::Result;

use hl_core::error::RegistryError;
use hl_manager::AddHostOutcome;

use super::parse_address;
use crate::context::ManagerContext;
use crate::output::{format_hosts, print_error, print_info, print_success, print_warning};

/// Probe every host and print the list
pub async fn list_command(ctx: &ManagerContext, long: bool) -> Result<()> {
    let hosts = ctx.registry.refresh_all().await;

    println!("{}", format_hosts(&hosts, long));

    if let Some(uri) = ctx.preferences.config().autoconnect_host_uri.as_deref() {
        let state = if ctx.preferences.config().autoconnect {
            "enabled"
        } else {
            "disabled"
        };
        print_info(&format!("Remembered host: {} (autoconnect {})", uri, state));
    }

    Ok(())
}

/// Add a host and report its status
pub async fn add_command(ctx: &ManagerContext, host: &str, port: u16) -> Result<()> {
    let outcome = match ctx.registry.add_host(host, port).await {
        Ok(outcome) => outcome,
        Err(e) => {
            print_error(&format!("Failed to add host: {}", e));
            return Err(e.into());
        }
    };

    match outcome {
        AddHostOutcome::Added(address) => {
            let status = ctx
                .registry
                .status_of(&address)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            print_success(&format!("Added {} ({})", address, status));
        }
        AddHostOutcome::AlreadyPresent(address) => {
            print_warning(&format!("Host {} is already listed", address));
        }
    }

    Ok(())
}

/// Remove a host from the list
pub async fn remove_command(ctx: &ManagerContext, address: &str) -> Result<()> {
    let address = parse_address(address)?;

    match ctx.registry.remove_host(&address).await {
        Ok(()) => {
            print_success(&format!("Removed {}", address));
            Ok(())
        }
        Err(e @ RegistryError::NotFound(_)) => {
            print_error(&format!("{}", e));
            print_info("Run 'hostlink list' to see configured hosts");
            Err(e.into())
        }
        Err(e) => {
            print_error(&format!("Failed to remove host: {}", e));
            Err(e.into())
        }
    }
}
