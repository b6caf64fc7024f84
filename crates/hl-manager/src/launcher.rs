//! Local daemon process launcher

use std::process::{Command, Stdio};

use hl_core::config::DaemonConfig;
use hl_core::error::LaunchError;
use hl_core::traits::DaemonLauncher;

/// Spawns `<program> <port_flag> <port>` as a detached background process
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: String,
    port_flag: String,
}

impl ProcessLauncher {
    /// Create a launcher for `program`
    pub fn new(program: impl Into<String>, port_flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            port_flag: port_flag.into(),
        }
    }

    /// Create a launcher from the `[daemon]` config section
    pub fn from_config(config: &DaemonConfig) -> Self {
        Self::new(config.program.clone(), config.port_flag.clone())
    }

    fn command(&self, port: u16) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.port_flag)
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl DaemonLauncher for ProcessLauncher {
    fn start(&self, port: u16) -> Result<(), LaunchError> {
        let mut child = self
            .command(port)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::info!(
            "Started local daemon {} on port {} (PID: {})",
            self.program,
            port,
            child.id()
        );

        // Reap the daemon when it exits so it never lingers as a zombie
        let program = self.program.clone();
        let reaper = std::thread::Builder::new()
            .name("hostlink-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => tracing::debug!("Local daemon {} exited: {}", program, status),
                Err(e) => tracing::warn!("Failed to wait for local daemon {}: {}", program, e),
            });
        if let Err(e) = reaper {
            tracing::warn!("Failed to start reaper thread: {}", e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let launcher = ProcessLauncher::new("hostlinkd", "-p");
        let cmd = launcher.command(58846);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "hostlinkd");
        assert_eq!(args, vec!["-p", "58846"]);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let launcher = ProcessLauncher::new("hostlink-test-no-such-daemon", "-p");
        assert!(matches!(
            launcher.start(58846),
            Err(LaunchError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_existing_program() {
        // `true` ignores its arguments and exits immediately
        let launcher = ProcessLauncher::new("true", "-p");
        launcher.start(58846).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_exited_daemons_are_reaped() {
        let launcher = ProcessLauncher::new("true", "-p");
        for port in 0..8 {
            launcher.start(58846 + port).unwrap();
        }

        // Reaped children drop out of the process table; zombies stay until waited on
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while own_zombies() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(own_zombies(), 0);
    }

    /// Zombie children of this process, read from /proc where available
    #[cfg(unix)]
    fn own_zombies() -> usize {
        let pid = std::process::id().to_string();
        let Ok(entries) = std::fs::read_dir("/proc") else {
            return 0;
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| std::fs::read_to_string(entry.path().join("stat")).ok())
            .filter(|stat| {
                // Fields after the parenthesised command: state, ppid, ...
                let rest = stat.rsplit_once(')').map(|(_, rest)| rest).unwrap_or("");
                let mut fields = rest.split_whitespace();
                fields.next() == Some("Z") && fields.next() == Some(pid.as_str())
            })
            .count()
    }
}
