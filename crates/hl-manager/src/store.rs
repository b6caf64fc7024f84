//! Host list stores

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use hl_core::config::{self, HostListFile};
use hl_core::error::ConfigError;
use hl_core::traits::HostListStore;

/// Host list kept in a TOML file (`hosts = ["host:port", ...]`)
#[derive(Debug, Clone)]
pub struct TomlHostListStore {
    path: PathBuf,
}

impl TomlHostListStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default host list location
    pub fn at_default_path() -> Self {
        Self::new(config::default_hostlist_path())
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HostListStore for TomlHostListStore {
    /// A missing file yields the default list with the local daemon
    fn load(&self) -> Result<Vec<String>, ConfigError> {
        let file: HostListFile = config::load_config_or_default(&self.path)?;
        Ok(file.hosts)
    }

    fn save(&self, hosts: &[String]) -> Result<(), ConfigError> {
        let file = HostListFile {
            hosts: hosts.to_vec(),
        };
        config::save_config(&self.path, &file)
    }
}

/// Host list held in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct InMemoryHostListStore {
    hosts: Mutex<Vec<String>>,
    saves: AtomicUsize,
}

impl InMemoryHostListStore {
    /// Create a store that initially holds `hosts`
    pub fn with_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: Mutex::new(hosts.into_iter().map(Into::into).collect()),
            saves: AtomicUsize::new(0),
        }
    }

    /// Last saved list
    pub fn hosts(&self) -> Vec<String> {
        self.hosts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl HostListStore for InMemoryHostListStore {
    fn load(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.hosts())
    }

    fn save(&self, hosts: &[String]) -> Result<(), ConfigError> {
        *self.hosts.lock().unwrap_or_else(PoisonError::into_inner) = hosts.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_default_list() {
        let dir = TempDir::new().unwrap();
        let store = TomlHostListStore::new(dir.path().join("hostlist.toml"));
        assert_eq!(store.load().unwrap(), vec!["localhost:58846"]);
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = TomlHostListStore::new(dir.path().join("hostlist.toml"));
        let hosts = vec![
            "b.example.com:58846".to_string(),
            "a.example.com:1234".to_string(),
        ];

        store.save(&hosts).unwrap();
        assert_eq!(store.load().unwrap(), hosts);
    }

    #[test]
    fn test_saved_empty_list_stays_empty() {
        let dir = TempDir::new().unwrap();
        let store = TomlHostListStore::new(dir.path().join("hostlist.toml"));
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_counts_saves() {
        let store = InMemoryHostListStore::with_hosts(["localhost:1"]);
        store.save(&["localhost:2".to_string()]).unwrap();
        assert_eq!(store.hosts(), vec!["localhost:2"]);
        assert_eq!(store.save_count(), 1);
    }
}
