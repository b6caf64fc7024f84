//! hostlink CLI
//!
//! Manages the list of daemon hosts:
//! - Probe hosts and show their status
//! - Add and remove hosts
//! - Start or stop daemons and connect to them
//! - Watch the list live with the startup connection policy applied

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hl_core::DEFAULT_DAEMON_PORT;
use hostlink::commands;
use hostlink::context::{ConfigPaths, ManagerContext};

#[derive(Parser)]
#[command(name = "hostlink")]
#[command(author, version, about = "Daemon host connection manager")]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding config.toml and hostlist.toml
    #[arg(long, global = true, env = "HOSTLINK_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe all hosts and list them with their status
    #[command(alias = "ls")]
    List {
        /// Show the actions available for each host
        #[arg(short, long)]
        long: bool,
    },

    /// Add a host to the list
    Add {
        /// Hostname, optionally with an http:// prefix
        host: String,
        /// Daemon port
        #[arg(short, long, default_value_t = DEFAULT_DAEMON_PORT)]
        port: u16,
    },

    /// Remove a host from the list
    #[command(alias = "rm")]
    Remove {
        /// Host address (host:port)
        address: String,
    },

    /// Connect to a host, starting a local daemon if it is offline
    Connect {
        /// Host address (host:port)
        address: String,
    },

    /// Forget the remembered autoconnect host
    Disconnect,

    /// Stop a running daemon, or start an offline local one
    Daemon {
        /// Host address (defaults to the local daemon)
        address: Option<String>,
    },

    /// Apply the startup policy and show live host status
    Watch {
        /// Refresh interval in milliseconds (overrides config)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get specific config value
    Get { key: String },
    /// Set config value
    Set { key: String, value: String },
    /// Show config directory path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let paths = ConfigPaths::resolve(cli.config_dir);

    // Config commands work on the files directly
    let command = match cli.command {
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show => commands::config_show(&paths),
                ConfigAction::Get { key } => commands::config_get(&paths, &key),
                ConfigAction::Set { key, value } => commands::config_set(&paths, &key, &value),
                ConfigAction::Path => commands::config_path(&paths),
            };
        }
        other => other,
    };

    let mut ctx = ManagerContext::open(paths)?;

    let result = match command {
        Commands::List { long } => commands::list_command(&ctx, long).await,
        Commands::Add { host, port } => commands::add_command(&ctx, &host, port).await,
        Commands::Remove { address } => commands::remove_command(&ctx, &address).await,
        Commands::Connect { address } => commands::connect_command(&mut ctx, &address).await,
        Commands::Disconnect => commands::disconnect_command(&mut ctx),
        Commands::Daemon { address } => {
            commands::daemon_command(&ctx, address.as_deref()).await
        }
        Commands::Watch { interval_ms } => {
            commands::watch_command(&mut ctx, interval_ms.map(Duration::from_millis)).await
        }
        Commands::Config { .. } => Ok(()),
    };

    ctx.registry.shutdown();
    result
}
