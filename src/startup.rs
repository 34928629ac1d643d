// src/startup.rs

//! Readiness gate run before the first rebuild.
//!
//! The zone repository is usually checked out by a sidecar, so the make
//! directory may not exist yet when we start. We poll for it until a
//! deadline; running out of time is fatal.

use std::path::Path;
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::errors::{Result, ZonewatchError};
use crate::fs::FileSystem;

/// How often the gate re-checks for the directory.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Block until `path` exists and is a directory, or fail once `max_wait` has
/// elapsed.
///
/// The path is always checked at least once, so a zero `max_wait` succeeds
/// when the directory is already there. A `max_wait` too large to put a
/// deadline on waits without one.
pub async fn wait_for_directory(
    fs: &dyn FileSystem,
    path: &Path,
    max_wait: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now().checked_add(max_wait);

    loop {
        if fs.is_dir(path) {
            return Ok(());
        }

        let Some(deadline) = deadline else {
            info!(path = ?path, "directory doesn't exist yet, waiting");
            tokio::time::sleep(poll_interval).await;
            continue;
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(ZonewatchError::StartupTimeout {
                path: path.to_path_buf(),
                waited: max_wait,
            });
        }

        let remaining = deadline - now;
        info!(
            path = ?path,
            remaining = ?remaining,
            "directory doesn't exist yet, waiting"
        );
        tokio::time::sleep(poll_interval.min(remaining)).await;
    }
}
