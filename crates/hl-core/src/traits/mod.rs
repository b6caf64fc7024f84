//! Core trait definitions

mod daemon;
mod store;

pub use daemon::{DaemonControl, DaemonLauncher, StatusProbe};
pub use store::HostListStore;
