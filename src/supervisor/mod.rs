// src/supervisor/mod.rs

//! Supervision of the name server process.
//!
//! - [`state`] is the pure transition table (launch / reload / exit).
//! - [`process`] is the mutex-guarded cell shared with the reload path.
//! - `signal` delivers SIGHUP, through a pidfd where the platform has one.
//! - [`server`] is the async loop that spawns named, waits for it and
//!   relaunches it after a clean exit.

pub mod process;
pub mod server;
mod signal;
pub mod state;

pub use process::{CurrentProcess, ProcessExit, ProcessSlot, ReloadOutcome, ReloadTarget};
pub use server::{ProcessSupervisor, ServerCommand, SupervisionEnd};
pub use state::{transition, ExitKind, SupervisorAction, SupervisorEvent, SupervisorState};
