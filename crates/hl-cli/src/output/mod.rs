//! Output formatting utilities for the CLI
//!
//! Host tables, startup summaries and colored status messages.

use std::io::{IsTerminal, Write};

use tabled::{settings::Style, Table, Tabled};

use hl_core::{ConnectAction, DaemonAction, HostActions, HostEntry, HostStatus};
use hl_manager::StartupOutcome;

/// Format the host list as an ASCII table
///
/// The detailed view adds the connect and daemon actions available for each
/// host, with disabled actions shown as `-`.
pub fn format_hosts(hosts: &[HostEntry], detailed: bool) -> String {
    if hosts.is_empty() {
        return "No hosts configured".to_string();
    }

    #[derive(Tabled)]
    struct HostRow {
        #[tabled(rename = "STATUS")]
        status: String,
        #[tabled(rename = "HOST")]
        host: String,
        #[tabled(rename = "PORT")]
        port: u16,
    }

    #[derive(Tabled)]
    struct HostRowDetailed {
        #[tabled(rename = "STATUS")]
        status: String,
        #[tabled(rename = "HOST")]
        host: String,
        #[tabled(rename = "PORT")]
        port: u16,
        #[tabled(rename = "CONNECT")]
        connect: String,
        #[tabled(rename = "DAEMON")]
        daemon: String,
        #[tabled(rename = "REMOVE")]
        remove: String,
    }

    if detailed {
        let rows: Vec<HostRowDetailed> = hosts
            .iter()
            .map(|h| {
                let actions = HostActions::for_host(&h.address, h.status);
                HostRowDetailed {
                    status: status_label(h.status).to_string(),
                    host: h.address.host().to_string(),
                    port: h.address.port(),
                    connect: enabled_or_dash(actions.connect_enabled, connect_label(actions.connect)),
                    daemon: enabled_or_dash(actions.daemon_enabled, daemon_label(actions.daemon)),
                    remove: enabled_or_dash(actions.remove_enabled, "remove"),
                }
            })
            .collect();

        Table::new(rows).with(Style::rounded()).to_string()
    } else {
        let rows: Vec<HostRow> = hosts
            .iter()
            .map(|h| HostRow {
                status: status_label(h.status).to_string(),
                host: h.address.host().to_string(),
                port: h.address.port(),
            })
            .collect();

        Table::new(rows).with(Style::rounded()).to_string()
    }
}

fn status_label(status: HostStatus) -> &'static str {
    match status {
        HostStatus::Connected => "● connected",
        HostStatus::Online => "○ online",
        HostStatus::Offline => "✗ offline",
    }
}

fn connect_label(action: ConnectAction) -> &'static str {
    match action {
        ConnectAction::Connect => "connect",
        ConnectAction::Disconnect => "disconnect",
    }
}

fn daemon_label(action: DaemonAction) -> &'static str {
    match action {
        DaemonAction::Start => "start",
        DaemonAction::Stop => "stop",
    }
}

fn enabled_or_dash(enabled: bool, label: &str) -> String {
    if enabled {
        label.to_string()
    } else {
        "-".to_string()
    }
}

/// One-line summary of what the startup policy did
pub fn format_startup(outcome: &StartupOutcome) -> String {
    match outcome {
        StartupOutcome::Classic(addr) => format!("Classic mode: connected to {}", addr),
        StartupOutcome::AutoConnected(addr) => format!("Auto-connected to {}", addr),
        StartupOutcome::AutoStarted(addr) => {
            format!("Started local daemon and connected to {}", addr)
        }
        StartupOutcome::Unreachable(addr) => format!("Remembered host {} is not online", addr),
        StartupOutcome::Idle => "No startup connection configured".to_string(),
    }
}

/// Redraw the host table in place when stdout is a terminal
pub fn print_hosts_frame(hosts: &[HostEntry]) {
    use crossterm::cursor::MoveTo;
    use crossterm::terminal::{Clear, ClearType};

    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        let _ = crossterm::execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
    }
    let _ = writeln!(stdout, "{}", format_hosts(hosts, false));
    let _ = stdout.flush();
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::HostAddress;

    fn entry(s: &str, status: HostStatus) -> HostEntry {
        HostEntry {
            address: s.parse::<HostAddress>().unwrap(),
            status,
        }
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_hosts(&[], false), "No hosts configured");
    }

    #[test]
    fn test_format_hosts_columns() {
        let table = format_hosts(
            &[
                entry("a.example.com:58846", HostStatus::Offline),
                entry("localhost:58846", HostStatus::Connected),
            ],
            false,
        );
        assert!(table.contains("HOST"));
        assert!(table.contains("a.example.com"));
        assert!(table.contains("58846"));
        assert!(table.contains("connected"));
        assert!(!table.contains("DAEMON"));
    }

    #[test]
    fn test_format_hosts_detailed_actions() {
        let table = format_hosts(&[entry("localhost:58846", HostStatus::Online)], true);
        assert!(table.contains("DAEMON"));
        assert!(table.contains("stop"));
        assert!(table.contains("connect"));
    }

    #[test]
    fn test_format_startup() {
        let addr: HostAddress = "localhost:58846".parse().unwrap();
        assert_eq!(
            format_startup(&StartupOutcome::AutoConnected(addr)),
            "Auto-connected to localhost:58846"
        );
        assert_eq!(
            format_startup(&StartupOutcome::Idle),
            "No startup connection configured"
        );
    }
}
