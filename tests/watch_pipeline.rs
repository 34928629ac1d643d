// tests/watch_pipeline.rs
mod common;
use crate::common::init_tracing;

use std::path::PathBuf;
use std::time::Duration;

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;

use zonewatch::exec::RebuildOutcome;
use zonewatch::supervisor::ReloadOutcome;
use zonewatch::watch::ChangePipeline;
use zonewatch_test_utils::recorders::{
    Mark, RecordingRebuild, RecordingReloadTarget, Timeline,
};

const MAKE_PATH: &str = "/etc/bind/git/masterzones";

fn event(kind: EventKind) -> notify::Result<Event> {
    Ok(Event::new(kind).add_path(PathBuf::from("/etc/bind/git/masterzones/example.com.zone")))
}

fn write_event() -> notify::Result<Event> {
    event(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
}

fn pipeline(
    timeline: &Timeline,
    rebuild_time: Duration,
) -> ChangePipeline<RecordingRebuild, RecordingReloadTarget> {
    ChangePipeline::new(
        RecordingRebuild::new(timeline.clone(), rebuild_time),
        RecordingReloadTarget::new(timeline.clone(), ReloadOutcome::Delivered),
        MAKE_PATH,
    )
}

/// Two writes 10ms apart while a 50ms rebuild is in flight: two full
/// rebuilds, back to back, each followed by its own reload attempt.
#[tokio::test(start_paused = true)]
async fn burst_of_writes_serializes_rebuilds_without_coalescing() {
    init_tracing();

    let timeline = Timeline::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(pipeline(&timeline, Duration::from_millis(50)).run(rx));

    tx.send(write_event()).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    tx.send(write_event()).unwrap();
    drop(tx);

    handle.await.unwrap();

    let make = PathBuf::from(MAKE_PATH);
    assert_eq!(
        timeline.marks(),
        vec![
            Mark::RebuildStarted(make.clone()),
            Mark::RebuildFinished(make.clone()),
            Mark::Reload,
            Mark::RebuildStarted(make.clone()),
            Mark::RebuildFinished(make.clone()),
            Mark::Reload,
        ]
    );
    assert!(timeline.rebuilds_never_overlap());

    // The second rebuild could only start after the first one finished.
    let timed = timeline.timed_marks();
    assert!(timed[3].0 - timed[0].0 >= Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn only_creates_and_writes_trigger_rebuilds() {
    init_tracing();

    let timeline = Timeline::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(pipeline(&timeline, Duration::from_millis(5)).run(rx));

    tx.send(event(EventKind::Remove(RemoveKind::File))).unwrap();
    tx.send(event(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))).unwrap();
    tx.send(event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))))
        .unwrap();
    tx.send(event(EventKind::Create(CreateKind::File))).unwrap();
    drop(tx);

    handle.await.unwrap();

    assert_eq!(timeline.count(|m| matches!(m, Mark::RebuildStarted(_))), 1);
    assert_eq!(timeline.count(|m| *m == Mark::Reload), 1);
}

#[tokio::test(start_paused = true)]
async fn transport_errors_do_not_stop_the_loop() {
    init_tracing();

    let timeline = Timeline::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(pipeline(&timeline, Duration::from_millis(5)).run(rx));

    tx.send(Err(notify::Error::generic("event queue overflow"))).unwrap();
    tx.send(Err(notify::Error::path_not_found().add_path(PathBuf::from(MAKE_PATH))))
        .unwrap();
    tx.send(write_event()).unwrap();
    drop(tx);

    handle.await.unwrap();

    assert_eq!(timeline.count(|m| matches!(m, Mark::RebuildFinished(_))), 1);
    assert_eq!(timeline.count(|m| *m == Mark::Reload), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_rebuild_is_still_followed_by_a_reload_attempt() {
    init_tracing();

    let timeline = Timeline::new();
    let pipeline = ChangePipeline::new(
        RecordingRebuild::new(timeline.clone(), Duration::from_millis(5)).failing(2),
        RecordingReloadTarget::new(timeline.clone(), ReloadOutcome::AlreadyExited),
        MAKE_PATH,
    );

    let outcome = pipeline
        .handle_event(&write_event().unwrap())
        .await
        .expect("write events qualify");

    assert_eq!(outcome.rebuild, RebuildOutcome::Failed { code: Some(2) });
    assert_eq!(outcome.reload, ReloadOutcome::AlreadyExited);
    assert_eq!(timeline.marks().last(), Some(&Mark::Reload));
}

#[tokio::test]
async fn ignored_events_report_nothing() {
    let timeline = Timeline::new();
    let pipeline = pipeline(&timeline, Duration::ZERO);

    let outcome = pipeline
        .handle_event(&event(EventKind::Remove(RemoveKind::Any)).unwrap())
        .await;

    assert!(outcome.is_none());
    assert!(timeline.marks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn changes_under_the_ignored_directory_do_not_rebuild() {
    init_tracing();

    let timeline = Timeline::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(
        pipeline(&timeline, Duration::from_millis(5))
            .ignoring(MAKE_PATH)
            .run(rx),
    );

    let generated = PathBuf::from(MAKE_PATH).join("named.zones");
    let write = EventKind::Modify(ModifyKind::Data(DataChange::Content));
    tx.send(Ok(Event::new(EventKind::Create(CreateKind::File)).add_path(generated.clone())))
        .unwrap();
    tx.send(Ok(Event::new(write).add_path(generated))).unwrap();
    tx.send(Ok(Event::new(write).add_path(PathBuf::from("/etc/bind/git/named.conf.local"))))
        .unwrap();
    drop(tx);

    handle.await.unwrap();

    assert_eq!(timeline.count(|m| matches!(m, Mark::RebuildStarted(_))), 1);
    assert_eq!(timeline.count(|m| *m == Mark::Reload), 1);
}
