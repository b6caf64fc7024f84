//! Host list persistence trait

use crate::error::ConfigError;

/// Persistence for the ordered host list
///
/// Entries are `host:port` strings in display order.
pub trait HostListStore: Send + Sync {
    /// Read the persisted list
    fn load(&self) -> Result<Vec<String>, ConfigError>;

    /// Replace the persisted list
    fn save(&self, hosts: &[String]) -> Result<(), ConfigError>;
}
