// src/watch/event_handler.rs

//! What happens on each filesystem notification.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::exec::{Rebuild, RebuildOutcome};
use crate::supervisor::{ReloadOutcome, ReloadTarget};

/// Whether an event kind should trigger a rebuild.
///
/// Creates and content writes qualify. `Modify(Any)` counts as a write
/// because some backends (kqueue, polling) report writes that way. Removes,
/// renames, metadata changes and accesses don't.
pub fn is_qualifying(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

/// Result of handling one qualifying event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeOutcome {
    pub rebuild: RebuildOutcome,
    pub reload: ReloadOutcome,
}

/// The rebuild-then-reload sequence run for each qualifying event.
pub struct ChangePipeline<R, T> {
    rebuilder: R,
    target: T,
    make_path: PathBuf,
    ignored: Option<PathBuf>,
}

impl<R, T> std::fmt::Debug for ChangePipeline<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePipeline")
            .field("make_path", &self.make_path)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

impl<R: Rebuild, T: ReloadTarget> ChangePipeline<R, T> {
    pub fn new(rebuilder: R, target: T, make_path: impl Into<PathBuf>) -> Self {
        Self {
            rebuilder,
            target,
            make_path: make_path.into(),
            ignored: None,
        }
    }

    /// Skip events whose paths all lie under `dir`.
    ///
    /// Used for the rebuild's own output directory when it sits inside a
    /// recursively watched tree; otherwise every file the rebuild writes
    /// would trigger another rebuild.
    pub fn ignoring(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ignored = Some(dir.into());
        self
    }

    pub fn make_path(&self) -> &Path {
        &self.make_path
    }

    fn is_ignored(&self, event: &Event) -> bool {
        match &self.ignored {
            Some(dir) => {
                !event.paths.is_empty() && event.paths.iter().all(|p| p.starts_with(dir))
            }
            None => false,
        }
    }

    /// Handle one notification.
    ///
    /// Returns `None` for events that don't qualify. Otherwise runs exactly
    /// one rebuild and then exactly one reload attempt, whatever the rebuild
    /// outcome was.
    pub async fn handle_event(&self, event: &Event) -> Option<ChangeOutcome> {
        if !is_qualifying(&event.kind) {
            debug!(kind = ?event.kind, paths = ?event.paths, "ignoring filesystem event");
            return None;
        }
        if self.is_ignored(event) {
            debug!(kind = ?event.kind, paths = ?event.paths, "ignoring change in rebuild output");
            return None;
        }

        info!(kind = ?event.kind, paths = ?event.paths, "zone repository changed");
        let rebuild = self.rebuilder.rebuild(&self.make_path).await;
        let reload = self.target.signal_reload();
        debug!(?rebuild, ?reload, "change handled");

        Some(ChangeOutcome { rebuild, reload })
    }

    /// Consume notifications until the channel closes.
    ///
    /// Events are handled one at a time: the next one isn't read until the
    /// previous rebuild and reload are done. Transport errors are logged and
    /// the loop carries on.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<notify::Result<Event>>) {
        while let Some(res) = events.recv().await {
            match res {
                Ok(event) => {
                    self.handle_event(&event).await;
                }
                Err(err) => {
                    error!(error = %err, paths = ?err.paths, "error watching zone repository");
                }
            }
        }
        debug!("watch event loop finished");
    }
}
