//! Persisted host list

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_DAEMON_PORT;

/// On-disk form of the host list (`hostlist.toml`)
///
/// Entries are kept as raw strings so a single malformed line does not make
/// the whole file unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostListFile {
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl Default for HostListFile {
    fn default() -> Self {
        Self {
            hosts: vec![format!("localhost:{}", DEFAULT_DAEMON_PORT)],
        }
    }
}
