// src/watch/watcher.rs

use std::path::PathBuf;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::Rebuild;
use crate::supervisor::ReloadTarget;
use crate::watch::event_handler::ChangePipeline;

/// Handle for the filesystem watch subscription.
///
/// Keeps the underlying `RecommendedWatcher` alive and owns the background
/// watch loop. Dropping it releases the OS watch and aborts the loop.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Subscribe to changes under `root` and run `pipeline` for each event on a
/// background task.
///
/// Failing to create the watcher or to add `root` is returned as an error;
/// the caller treats it as fatal.
pub fn spawn_watcher<R, T>(
    root: impl Into<PathBuf>,
    recursive: bool,
    pipeline: ChangePipeline<R, T>,
) -> Result<WatcherHandle>
where
    R: Rebuild + 'static,
    T: ReloadTarget + 'static,
{
    let root = root.into();

    // Recursively watching a tree that contains the make directory would see
    // every file the rebuild writes.
    let pipeline = if recursive
        && pipeline.make_path() != root.as_path()
        && pipeline.make_path().starts_with(&root)
    {
        let make_path = pipeline.make_path().to_path_buf();
        debug!(make_path = ?make_path, "ignoring changes under the make directory");
        pipeline.ignoring(make_path)
    } else {
        pipeline
    };

    // Channel from the blocking notify callback into the async world. Errors
    // travel alongside events so they are logged in order with them.
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = event_tx.send(res) {
                // Receiver gone: the watch loop was aborted.
                eprintln!("zonewatch: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&root, mode)?;

    info!(root = ?root, recursive, "file watcher started");

    let task = tokio::spawn(pipeline.run(event_rx));

    Ok(WatcherHandle {
        _inner: watcher,
        task,
    })
}
