//! hl-cli: Command-line interface for hostlink
//!
//! Provides the `hostlink` CLI for managing the daemon host list, probing
//! hosts and starting, stopping and connecting to daemons.

pub mod commands;
pub mod context;
pub mod output;
