// src/exec/rebuild.rs

//! Serialized execution of the zone regeneration command.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Result of one rebuild attempt.
///
/// Failures are reported here and logged, never escalated: the caller keeps
/// running whatever happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Succeeded,
    /// The command ran and exited non-zero (`None` if killed by a signal).
    Failed { code: Option<i32> },
    /// The command could not be started or waited on.
    LaunchFailed,
}

/// Anything that can regenerate artifacts rooted at a path.
///
/// Production code uses [`RebuildCoordinator`]; tests substitute recorders
/// that don't spawn processes.
pub trait Rebuild: Send + Sync {
    fn rebuild<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = RebuildOutcome> + Send + 'a>>;
}

impl<R: Rebuild + ?Sized> Rebuild for Arc<R> {
    fn rebuild<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = RebuildOutcome> + Send + 'a>> {
        (**self).rebuild(path)
    }
}

/// The regeneration command: `program [args..] <path>`.
#[derive(Debug, Clone)]
pub struct RebuildCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl RebuildCommand {
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

    /// `make -C <path>`.
    pub fn make(make_binary: impl Into<PathBuf>) -> Self {
        Self::new(make_binary).arg("-C")
    }

    fn to_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

/// Runs the regeneration command, never more than one at a time.
///
/// The lock is global across paths and held only while the command runs.
/// Concurrent callers queue on it and each still gets its own full rebuild.
#[derive(Debug)]
pub struct RebuildCoordinator {
    command: RebuildCommand,
    running: Mutex<()>,
}

impl RebuildCoordinator {
    pub fn new(command: RebuildCommand) -> Self {
        Self {
            command,
            running: Mutex::new(()),
        }
    }

    /// Run the command in `path` and wait for it.
    pub async fn run(&self, path: &Path) -> RebuildOutcome {
        let _guard = self.running.lock().await;

        info!(
            program = ?self.command.program,
            path = ?path,
            "regenerating zone artifacts"
        );

        let status = match self.command.to_command(path).status().await {
            Ok(status) => status,
            Err(e) => {
                error!(
                    program = ?self.command.program,
                    path = ?path,
                    error = %e,
                    "cannot run rebuild command"
                );
                return RebuildOutcome::LaunchFailed;
            }
        };

        if status.success() {
            debug!(path = ?path, "rebuild finished");
            RebuildOutcome::Succeeded
        } else {
            error!(
                program = ?self.command.program,
                path = ?path,
                exit_code = ?status.code(),
                "rebuild command failed"
            );
            RebuildOutcome::Failed {
                code: status.code(),
            }
        }
    }
}

impl Rebuild for RebuildCoordinator {
    fn rebuild<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = RebuildOutcome> + Send + 'a>> {
        Box::pin(self.run(path))
    }
}
