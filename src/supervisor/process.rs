// src/supervisor/process.rs

//! The one piece of state shared between the supervision loop and the
//! reload path.
//!
//! [`CurrentProcess`] is a cheap-to-clone handle to a mutex-guarded cell
//! holding the supervision state and the slot of the process launched most
//! recently. The supervision loop is the only writer; the watch loop reads it
//! through [`ReloadTarget::signal_reload`]. A reader either sees a fully
//! published slot or none at all, and the signal is sent while the lock is
//! held, so a relaunch can never swap the slot between the liveness check and
//! the signal. The signal itself goes through a [`SignalHandle`] opened at
//! publish time, which refuses to reach a process that was already reaped.

use std::ffi::OsString;
use std::io;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::signal::SignalHandle;
use super::state::{transition, SupervisorAction, SupervisorEvent, SupervisorState};

/// How a recorded process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when terminated by a signal or when waiting failed.
    pub code: Option<i32>,
    pub success: bool,
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}

/// The process launched most recently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSlot {
    /// OS process id; `None` if the handle never got one.
    pub pid: Option<u32>,
    pub args: Vec<OsString>,
    /// Set once the supervision loop has observed the exit.
    pub exit: Option<ProcessExit>,
}

impl ProcessSlot {
    pub fn new(pid: Option<u32>, args: Vec<OsString>) -> Self {
        Self {
            pid,
            args,
            exit: None,
        }
    }
}

/// What happened to a reload request.
///
/// None of these are errors: anything other than `Delivered` means the
/// signal was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Delivered,
    /// Nothing has been launched yet.
    NoProcess,
    /// A slot exists but has no OS process behind it.
    NotStarted,
    /// The process has exited (or vanished under us).
    AlreadyExited,
}

/// Something that can be told to reload its configuration.
pub trait ReloadTarget: Send + Sync {
    fn signal_reload(&self) -> ReloadOutcome;
}

#[derive(Debug)]
struct Shared {
    state: SupervisorState,
    slot: Option<ProcessSlot>,
    signal: Option<SignalHandle>,
}

/// Shared handle to the supervised process.
#[derive(Debug, Clone)]
pub struct CurrentProcess {
    inner: Arc<Mutex<Shared>>,
}

impl Default for CurrentProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrentProcess {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Shared {
                state: SupervisorState::NotStarted,
                slot: None,
                signal: None,
            })),
        }
    }

    /// Current supervision state.
    pub fn state(&self) -> SupervisorState {
        self.lock().state
    }

    /// A consistent copy of the current slot.
    pub fn snapshot(&self) -> Option<ProcessSlot> {
        self.lock().slot.clone()
    }

    /// Feed an event through the transition table and return the action.
    pub(crate) fn apply(&self, event: SupervisorEvent) -> SupervisorAction {
        let mut shared = self.lock();
        let (next, action) = transition(shared.state, event);
        debug!(from = ?shared.state, to = ?next, ?event, ?action, "supervisor transition");
        shared.state = next;
        action
    }

    /// Replace the slot with a freshly launched process.
    ///
    /// Call before waiting on the child: the signal handle is opened here.
    pub(crate) fn publish(&self, slot: ProcessSlot) {
        let signal = slot.pid.map(SignalHandle::open);
        let mut shared = self.lock();
        shared.slot = Some(slot);
        shared.signal = signal;
    }

    /// Record the exit of the process with `pid`.
    ///
    /// Ignored if the slot has since been replaced by another process.
    pub(crate) fn record_exit(&self, pid: Option<u32>, exit: ProcessExit) {
        let mut shared = self.lock();
        match shared.slot.as_mut() {
            Some(slot) if slot.pid == pid => slot.exit = Some(exit),
            _ => debug!(?pid, "exit recorded for a process that is no longer current"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // The cell only ever holds plain data, so a poisoned lock is still
        // consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ReloadTarget for CurrentProcess {
    fn signal_reload(&self) -> ReloadOutcome {
        let mut shared = self.lock();

        let Some(slot) = shared.slot.as_ref() else {
            debug!("no name server launched yet; dropping reload");
            return ReloadOutcome::NoProcess;
        };
        let Some(pid) = slot.pid else {
            debug!("name server has no process id; dropping reload");
            return ReloadOutcome::NotStarted;
        };
        if slot.exit.is_some() {
            debug!(pid, "name server already exited; dropping reload");
            return ReloadOutcome::AlreadyExited;
        }

        let (next, action) = transition(shared.state, SupervisorEvent::ReloadRequested);
        shared.state = next;
        if action != SupervisorAction::SignalReload {
            debug!(pid, state = ?next, "supervisor not running; dropping reload");
            return ReloadOutcome::AlreadyExited;
        }

        let sent = match shared.signal.as_ref() {
            Some(signal) => signal.send_sighup(),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no signal handle")),
        };
        match sent {
            Ok(()) => {
                info!(pid, "sent SIGHUP to name server");
                ReloadOutcome::Delivered
            }
            Err(e) => {
                warn!(pid, error = %e, "cannot signal name server; dropping reload");
                ReloadOutcome::AlreadyExited
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::state::ExitKind;

    #[test]
    fn nothing_launched_is_a_no_op() {
        let current = CurrentProcess::new();
        assert_eq!(current.signal_reload(), ReloadOutcome::NoProcess);
    }

    #[test]
    fn slot_without_pid_is_a_no_op() {
        let current = CurrentProcess::new();
        current.apply(SupervisorEvent::LaunchRequested);
        current.publish(ProcessSlot::new(None, vec![]));
        assert_eq!(current.signal_reload(), ReloadOutcome::NotStarted);
    }

    #[test]
    fn recorded_exit_is_a_no_op() {
        let current = CurrentProcess::new();
        current.apply(SupervisorEvent::LaunchRequested);
        current.publish(ProcessSlot::new(Some(u32::MAX), vec![]));
        current.record_exit(
            Some(u32::MAX),
            ProcessExit {
                code: Some(1),
                success: false,
            },
        );
        current.apply(SupervisorEvent::ProcessExited(ExitKind::Error));

        assert_eq!(current.signal_reload(), ReloadOutcome::AlreadyExited);
        assert_eq!(current.state(), SupervisorState::Exited(ExitKind::Error));
    }

    #[test]
    fn stale_exit_does_not_touch_a_newer_slot() {
        let current = CurrentProcess::new();
        current.publish(ProcessSlot::new(Some(10), vec![]));
        current.publish(ProcessSlot::new(Some(11), vec![]));
        current.record_exit(
            Some(10),
            ProcessExit {
                code: Some(0),
                success: true,
            },
        );
        assert_eq!(current.snapshot().and_then(|s| s.exit), None);
    }

    #[cfg(unix)]
    #[test]
    fn reaped_but_unrecorded_child_is_not_signalled() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();

        let current = CurrentProcess::new();
        current.apply(SupervisorEvent::LaunchRequested);
        current.publish(ProcessSlot::new(Some(pid), vec![]));

        // Reaped, but the supervision loop hasn't recorded the exit yet.
        child.wait().unwrap();

        assert_eq!(current.signal_reload(), ReloadOutcome::AlreadyExited);
    }
}
