// src/supervisor/state.rs

//! Pure supervision state machine.
//!
//! The relaunch policy lives here as an explicit transition table rather than
//! as loop control flow, so "stop on error, relaunch on clean exit" can be
//! read and tested without processes or Tokio.

/// How a supervised process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Clean,
    Error,
}

/// Lifecycle state of the supervised server.
///
/// Reloading is transient and never stored: a reload leaves the state at
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    NotStarted,
    Running,
    Exited(ExitKind),
}

impl SupervisorState {
    /// Once the supervisor has stopped, nothing else happens.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SupervisorState::Exited(_))
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorEvent {
    LaunchRequested,
    ReloadRequested,
    /// Spawn failed; treated like an error exit.
    LaunchFailed,
    ProcessExited(ExitKind),
}

/// What the IO shell should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorAction {
    /// Spawn the server with inherited streams.
    Spawn,
    /// Deliver SIGHUP if the process is still alive.
    SignalReload,
    /// Launch again straight away.
    Relaunch,
    /// Log the failure and stop supervising for good.
    Stop,
    /// The event doesn't apply in this state.
    Ignore,
}

/// The transition table.
///
/// | Current    | Event            | Next          | Action       |
/// |------------|------------------|---------------|--------------|
/// | NotStarted | launch requested | Running       | Spawn        |
/// | NotStarted | launch failed    | Exited(Error) | Stop         |
/// | Running    | reload requested | Running       | SignalReload |
/// | Running    | exited with error| Exited(Error) | Stop         |
/// | Running    | exited cleanly   | NotStarted    | Relaunch     |
///
/// Every other pair leaves the state unchanged with `Ignore`.
pub fn transition(
    state: SupervisorState,
    event: SupervisorEvent,
) -> (SupervisorState, SupervisorAction) {
    use SupervisorAction as A;
    use SupervisorEvent as E;
    use SupervisorState as S;

    match (state, event) {
        (S::NotStarted, E::LaunchRequested) => (S::Running, A::Spawn),
        (S::NotStarted, E::LaunchFailed) => (S::Exited(ExitKind::Error), A::Stop),
        (S::Running, E::ReloadRequested) => (S::Running, A::SignalReload),
        (S::Running, E::ProcessExited(ExitKind::Error)) => (S::Exited(ExitKind::Error), A::Stop),
        (S::Running, E::ProcessExited(ExitKind::Clean)) => (S::NotStarted, A::Relaunch),
        (state, _) => (state, A::Ignore),
    }
}
