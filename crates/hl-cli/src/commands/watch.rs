//! Watch command: startup policy plus a live host table

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use hl_core::error::ConnectError;
use hl_core::HostEntry;
use hl_manager::{run_startup, RefreshTimer};

use crate::context::ManagerContext;
use crate::output::{format_startup, print_error, print_hosts_frame, print_info, print_success};

/// Apply the startup policy, then redraw the host table on every refresh
/// until Ctrl+C or SIGTERM.
pub async fn watch_command(ctx: &mut ManagerContext, interval: Option<Duration>) -> Result<()> {
    let cancel = ctx.registry.cancellation_token();
    spawn_signal_handler(cancel.clone());

    let config = ctx.preferences.config().clone();
    match run_startup(&ctx.registry, &config).await {
        Ok(outcome) => {
            if outcome.connected().is_some() {
                print_success(&format_startup(&outcome));
            } else {
                print_info(&format_startup(&outcome));
            }
        }
        Err(ConnectError::Cancelled(_)) => return Ok(()),
        Err(e) => print_error(&format!("Startup connection failed: {}", e)),
    }

    if !config.show_connection_manager_on_start && ctx.registry.connection().is_connected() {
        print_info("Host table hidden at startup; waiting for Ctrl+C");
        cancel.cancelled().await;
        return Ok(());
    }

    let interval = interval.unwrap_or(config.refresh_interval);
    let (tx, mut rx) = mpsc::channel::<Vec<HostEntry>>(4);
    let timer = RefreshTimer::spawn(ctx.registry.clone(), interval, tx);

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(hosts) => print_hosts_frame(&hosts),
                None => break,
            },
            _ = cancel.cancelled() => break,
        }
    }

    timer.cancel();
    timer.join().await;

    if ctx.preferences.remember_connected(ctx.registry.connection())? {
        tracing::info!("Remembered connection for next start");
    }
    Ok(())
}

fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, stopping...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, stopping...");
            }
        }

        cancel.cancel();
    });
}
