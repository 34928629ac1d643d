// src/exec/mod.rs

//! Process execution for zone regeneration.
//!
//! - [`rebuild`] owns the `RebuildCoordinator`, which runs `make` (or any
//!   configured regeneration command) with inherited standard streams and
//!   guarantees at most one rebuild runs at any instant.
//! - The [`Rebuild`] trait is the seam the watch loop talks to, so tests can
//!   swap in a recorder without spawning processes.

pub mod rebuild;

pub use rebuild::{Rebuild, RebuildCommand, RebuildCoordinator, RebuildOutcome};
