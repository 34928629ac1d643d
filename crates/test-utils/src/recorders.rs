//! Recording stand-ins for the rebuild and reload seams.
//!
//! Both push into one shared [`Timeline`], so tests can assert on ordering
//! across the two (rebuild enter/exit, then reload) as well as on overlap.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use zonewatch::exec::{Rebuild, RebuildOutcome};
use zonewatch::supervisor::{ReloadOutcome, ReloadTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    RebuildStarted(PathBuf),
    RebuildFinished(PathBuf),
    Reload,
}

/// Shared, ordered log of what happened and when.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    marks: Arc<Mutex<Vec<(Instant, Mark)>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, mark: Mark) {
        self.marks.lock().unwrap().push((Instant::now(), mark));
    }

    pub fn marks(&self) -> Vec<Mark> {
        self.marks.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn timed_marks(&self) -> Vec<(Instant, Mark)> {
        self.marks.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Mark) -> bool) -> usize {
        self.marks.lock().unwrap().iter().filter(|(_, m)| pred(m)).count()
    }

    /// True if no rebuild started while another was still running.
    pub fn rebuilds_never_overlap(&self) -> bool {
        let mut running = 0usize;
        for (_, mark) in self.marks.lock().unwrap().iter() {
            match mark {
                Mark::RebuildStarted(_) => {
                    running += 1;
                    if running > 1 {
                        return false;
                    }
                }
                Mark::RebuildFinished(_) => running = running.saturating_sub(1),
                Mark::Reload => {}
            }
        }
        true
    }
}

/// A rebuild that sleeps for a fixed time and records enter/exit.
///
/// It does no locking of its own; wrap calls in the real coordinator's
/// discipline (or the watch loop's sequencing) to get serialization.
#[derive(Debug, Clone)]
pub struct RecordingRebuild {
    timeline: Timeline,
    duration: Duration,
    outcome: RebuildOutcome,
}

impl RecordingRebuild {
    pub fn new(timeline: Timeline, duration: Duration) -> Self {
        Self {
            timeline,
            duration,
            outcome: RebuildOutcome::Succeeded,
        }
    }

    pub fn failing(mut self, code: i32) -> Self {
        self.outcome = RebuildOutcome::Failed { code: Some(code) };
        self
    }
}

impl Rebuild for RecordingRebuild {
    fn rebuild<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = RebuildOutcome> + Send + 'a>> {
        Box::pin(async move {
            self.timeline.push(Mark::RebuildStarted(path.to_path_buf()));
            tokio::time::sleep(self.duration).await;
            self.timeline.push(Mark::RebuildFinished(path.to_path_buf()));
            self.outcome
        })
    }
}

/// A reload target that records each attempt and answers with a fixed outcome.
#[derive(Debug, Clone)]
pub struct RecordingReloadTarget {
    timeline: Timeline,
    outcome: ReloadOutcome,
}

impl RecordingReloadTarget {
    pub fn new(timeline: Timeline, outcome: ReloadOutcome) -> Self {
        Self { timeline, outcome }
    }
}

impl ReloadTarget for RecordingReloadTarget {
    fn signal_reload(&self) -> ReloadOutcome {
        self.timeline.push(Mark::Reload);
        self.outcome
    }
}
