//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HostError;

/// Port the daemon listens on when none is configured
pub const DEFAULT_DAEMON_PORT: u16 = 58846;

/// Scheme used when rendering a host as an RPC URI
const URI_SCHEME: &str = "http://";

/// Hostnames treated as the local machine
const LOCAL_HOSTNAMES: [&str; 2] = ["localhost", "127.0.0.1"];

/// Address of one daemon endpoint (`hostname:port`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostAddress {
    host: String,
    port: u16,
}

impl HostAddress {
    /// Create an address from a hostname and port.
    ///
    /// Any `scheme://` prefix on the hostname is stripped. Fails with
    /// [`HostError::InvalidHostname`] if nothing is left afterwards.
    pub fn new(hostname: &str, port: u16) -> Result<Self, HostError> {
        let host = strip_scheme(hostname.trim()).trim_end_matches('/');
        if host.is_empty() {
            return Err(HostError::InvalidHostname(hostname.to_string()));
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Address of a daemon on this machine
    pub fn localhost(port: u16) -> Self {
        Self {
            host: "localhost".to_string(),
            port,
        }
    }

    /// Hostname component
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port component
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether this address names the local machine
    pub fn is_local(&self) -> bool {
        LOCAL_HOSTNAMES.contains(&self.host.as_str())
    }

    /// RPC URI for this host (`http://host:port`)
    pub fn uri(&self) -> String {
        format!("{}{}:{}", URI_SCHEME, self.host, self.port)
    }

    /// Socket address to dial. `localhost` is dialed as `127.0.0.1` so the
    /// probe never depends on resolver configuration.
    pub fn dial_target(&self) -> String {
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, self.port)
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for HostAddress {
    type Err = HostError;

    /// Parse `host:port` or `http://host:port`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = strip_scheme(s.trim()).trim_end_matches('/');
        let (host, port) = trimmed
            .rsplit_once(':')
            .ok_or_else(|| HostError::InvalidAddress(s.to_string()))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| HostError::InvalidAddress(s.to_string()))?;
        Self::new(host, port)
    }
}

impl TryFrom<String> for HostAddress {
    type Error = HostError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HostAddress> for String {
    fn from(addr: HostAddress) -> Self {
        addr.to_string()
    }
}

fn strip_scheme(s: &str) -> &str {
    match s.find("://") {
        Some(idx) => &s[idx + 3..],
        None => s,
    }
}

/// Last observed status of a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    /// Liveness probe failed or has not run yet
    Offline,
    /// Liveness probe succeeded
    Online,
    /// Host is the current connection target
    Connected,
}

impl HostStatus {
    /// Status for a raw probe result
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            HostStatus::Online
        } else {
            HostStatus::Offline
        }
    }

    /// Whether a daemon is answering at this host
    pub fn is_running(self) -> bool {
        matches!(self, HostStatus::Online | HostStatus::Connected)
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostStatus::Offline => write!(f, "offline"),
            HostStatus::Online => write!(f, "online"),
            HostStatus::Connected => write!(f, "connected"),
        }
    }
}

/// A known host together with its effective status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub address: HostAddress,
    pub status: HostStatus,
}

/// What the connect action does for a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectAction {
    Connect,
    Disconnect,
}

/// What the daemon action does for a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonAction {
    Start,
    Stop,
}

/// Which actions are available for the selected host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostActions {
    pub connect: ConnectAction,
    pub connect_enabled: bool,
    pub remove_enabled: bool,
    pub daemon: DaemonAction,
    pub daemon_enabled: bool,
}

impl HostActions {
    /// Actions for a host with the given effective status
    pub fn for_host(address: &HostAddress, status: HostStatus) -> Self {
        let local = address.is_local();
        let connected = status == HostStatus::Connected;

        Self {
            connect: if connected {
                ConnectAction::Disconnect
            } else {
                ConnectAction::Connect
            },
            // An offline remote host can't be started, so it can't be connected either
            connect_enabled: !(status == HostStatus::Offline && !local),
            remove_enabled: !connected,
            daemon: if status.is_running() {
                DaemonAction::Stop
            } else {
                DaemonAction::Start
            },
            daemon_enabled: local,
        }
    }

    /// Actions when the host list is empty: only starting a local daemon
    pub fn empty_registry() -> Self {
        Self {
            connect: ConnectAction::Connect,
            connect_enabled: false,
            remove_enabled: false,
            daemon: DaemonAction::Start,
            daemon_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_scheme() {
        let addr = HostAddress::new("http://example.com", 58846).unwrap();
        assert_eq!(addr.host(), "example.com");
        assert_eq!(addr.to_string(), "example.com:58846");
        assert_eq!(addr.uri(), "http://example.com:58846");
    }

    #[test]
    fn test_new_rejects_empty_hostname() {
        assert!(matches!(
            HostAddress::new("http://", 1),
            Err(HostError::InvalidHostname(_))
        ));
        assert!(matches!(
            HostAddress::new("   ", 1),
            Err(HostError::InvalidHostname(_))
        ));
    }

    #[test]
    fn test_parse_with_and_without_scheme() {
        let a: HostAddress = "localhost:58846".parse().unwrap();
        let b: HostAddress = "http://localhost:58846".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.port(), 58846);
    }

    #[test]
    fn test_parse_rejects_missing_port() {
        assert!(matches!(
            "localhost".parse::<HostAddress>(),
            Err(HostError::InvalidAddress(_))
        ));
        assert!(matches!(
            "localhost:notaport".parse::<HostAddress>(),
            Err(HostError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_is_local() {
        assert!(HostAddress::localhost(1).is_local());
        assert!(HostAddress::new("127.0.0.1", 1).unwrap().is_local());
        assert!(!HostAddress::new("a.example.com", 1).unwrap().is_local());
    }

    #[test]
    fn test_dial_target_rewrites_localhost() {
        assert_eq!(HostAddress::localhost(58846).dial_target(), "127.0.0.1:58846");
        let remote = HostAddress::new("a.example.com", 7).unwrap();
        assert_eq!(remote.dial_target(), "a.example.com:7");
    }

    #[test]
    fn test_address_serializes_as_string() {
        let addr = HostAddress::localhost(58846);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, r#""localhost:58846""#);
        let back: HostAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(HostStatus::Connected.to_string(), "connected");
        assert_eq!(HostStatus::from_reachable(false), HostStatus::Offline);
    }

    #[test]
    fn test_actions_for_connected_host() {
        let actions = HostActions::for_host(&HostAddress::localhost(1), HostStatus::Connected);
        assert_eq!(actions.connect, ConnectAction::Disconnect);
        assert!(!actions.remove_enabled);
        assert_eq!(actions.daemon, DaemonAction::Stop);
    }

    #[test]
    fn test_actions_for_offline_remote_host() {
        let remote = HostAddress::new("a.example.com", 58846).unwrap();
        let actions = HostActions::for_host(&remote, HostStatus::Offline);
        assert!(!actions.connect_enabled);
        assert!(!actions.daemon_enabled);
        assert!(actions.remove_enabled);
    }

    #[test]
    fn test_actions_for_offline_local_host() {
        let actions = HostActions::for_host(&HostAddress::localhost(1), HostStatus::Offline);
        assert!(actions.connect_enabled);
        assert_eq!(actions.daemon, DaemonAction::Start);
        assert!(actions.daemon_enabled);
    }
}
