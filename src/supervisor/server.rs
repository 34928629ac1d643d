// src/supervisor/server.rs

//! The supervision loop around the name server process.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{error, info, warn};

use super::process::{CurrentProcess, ProcessExit, ProcessSlot};
use super::state::{ExitKind, SupervisorAction, SupervisorEvent};

/// The server command line: `program [args..]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ServerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `named -c <config> -g -u <user> -p <port>`: foreground, logging to
    /// stderr, dropping privileges to `user`.
    pub fn named(
        named_binary: impl Into<PathBuf>,
        bind_config: &Path,
        bind_user: &str,
        port: u16,
    ) -> Self {
        Self::new(named_binary)
            .arg("-c")
            .arg(bind_config)
            .arg("-g")
            .arg("-u")
            .arg(bind_user)
            .arg("-p")
            .arg(port.to_string())
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

/// Why supervision stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisionEnd {
    /// How many times the server was successfully spawned.
    pub launches: u64,
    /// The exit that ended supervision; `None` if the last spawn failed.
    pub last_exit: Option<ProcessExit>,
    pub reason: String,
}

impl fmt::Display for SupervisionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} launch(es))", self.reason, self.launches)
    }
}

/// Owns the server's lifecycle: launch, wait, relaunch on clean exit, stop
/// on error.
#[derive(Debug)]
pub struct ProcessSupervisor {
    command: ServerCommand,
    current: CurrentProcess,
    launches: u64,
}

impl ProcessSupervisor {
    pub fn new(command: ServerCommand, current: CurrentProcess) -> Self {
        Self {
            command,
            current,
            launches: 0,
        }
    }

    /// Start the server and block until it exits.
    ///
    /// Returns `Ok(exit)` for a clean exit, so the caller can launch again;
    /// anything else ends supervision and comes back as `Err`.
    pub async fn launch_once(&mut self) -> Result<ProcessExit, SupervisionEnd> {
        let mut child = match self.command.to_command().spawn() {
            Ok(child) => child,
            Err(e) => {
                self.current.apply(SupervisorEvent::LaunchFailed);
                error!(
                    program = ?self.command.program,
                    error = %e,
                    "running named failed"
                );
                return Err(self.end(None, format!("cannot start {:?}: {e}", self.command.program)));
            }
        };

        if self.current.apply(SupervisorEvent::LaunchRequested) != SupervisorAction::Spawn {
            warn!("launch requested while the supervisor was not idle");
        }

        let pid = child.id();
        self.launches += 1;
        self.current
            .publish(ProcessSlot::new(pid, self.command.args.clone()));
        info!(
            program = ?self.command.program,
            args = ?self.command.args,
            pid = ?pid,
            launch = self.launches,
            "name server started"
        );

        let exit = match child.wait().await {
            Ok(status) => ProcessExit::from(status),
            Err(e) => {
                error!(pid = ?pid, error = %e, "cannot wait for name server");
                ProcessExit {
                    code: None,
                    success: false,
                }
            }
        };
        self.current.record_exit(pid, exit);

        let kind = if exit.success {
            ExitKind::Clean
        } else {
            ExitKind::Error
        };

        match self.current.apply(SupervisorEvent::ProcessExited(kind)) {
            SupervisorAction::Relaunch => {
                info!(pid = ?pid, "name server exited cleanly");
                Ok(exit)
            }
            _ => {
                error!(pid = ?pid, exit_code = ?exit.code, "running named failed");
                let reason = match exit.code {
                    Some(code) => format!("named exited with status {code}"),
                    None => "named was terminated by a signal".to_string(),
                };
                Err(self.end(Some(exit), reason))
            }
        }
    }

    /// The supervision loop: relaunch on every clean exit, return on the
    /// first error.
    pub async fn run(mut self) -> SupervisionEnd {
        loop {
            match self.launch_once().await {
                Ok(_) => info!(launch = self.launches + 1, "relaunching name server"),
                Err(end) => return end,
            }
        }
    }

    fn end(&self, last_exit: Option<ProcessExit>, reason: String) -> SupervisionEnd {
        SupervisionEnd {
            launches: self.launches,
            last_exit,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_command_line_matches_bind_flags() {
        let cmd = ServerCommand::named(
            "/usr/sbin/named",
            Path::new("/etc/bind/named.conf"),
            "named",
            5353,
        );
        let args: Vec<_> = cmd.args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            ["-c", "/etc/bind/named.conf", "-g", "-u", "named", "-p", "5353"]
        );
    }

    #[tokio::test]
    async fn spawn_failure_ends_supervision_without_a_launch() {
        let current = CurrentProcess::new();
        let supervisor =
            ProcessSupervisor::new(ServerCommand::new("/nonexistent/named"), current.clone());

        let end = supervisor.run().await;

        assert_eq!(end.launches, 0);
        assert_eq!(end.last_exit, None);
        assert!(end.reason.contains("cannot start"));
        assert!(current.state().is_terminal());
    }
}
