// src/watch/mod.rs

//! File watching and change handling.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) on the zone
//!   repository.
//! - Deciding which notifications count as a change (creates and writes).
//! - Running the rebuild-then-reload sequence for each change, one event at
//!   a time.

pub mod event_handler;
pub mod watcher;

pub use event_handler::{is_qualifying, ChangeOutcome, ChangePipeline};
pub use watcher::{spawn_watcher, WatcherHandle};
