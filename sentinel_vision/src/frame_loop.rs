// THEORY:
// The `FrameLoop` is the driver. It is single-threaded and strictly sequential: one
// frame is acquired, analysed and fully acted upon before the next is read, so the
// event controller sees frames in acquisition order and artifacts of one event are
// written before the next event's begin.
//
// Loop steps, once per iteration:
// 1.  **Controls**: drain pending control events without blocking. `Quit` ends the
//     loop; `ManualSnapshot` is remembered for this frame.
// 2.  **Acquisition**: pull a frame. End of stream or a read failure ends the loop.
// 3.  **Preparation & Analysis**: resize, convert and crop, then run the pipeline on
//     the unannotated frame.
// 4.  **Annotation**: draw boxes, hulls, labels and the timestamp on a copy.
// 5.  **Dispatch**: turn controller signals into snapshot, clip and log writes.
// 6.  **Preview & Debug**: show the frame, dump masks if asked to.
//
// Sink failures are logged and skipped. Only a run of `max_sink_failures`
// consecutive failures escalates to a fatal error. Whatever ends the loop, an open
// clip is finalized before the sinks are released.

use crate::config::SentinelConfig;
use crate::core_modules::event_controller::EventSignal;
use crate::core_modules::frame;
use crate::error::{Result, SentinelError, SinkError};
use crate::io::overlay;
use crate::io::sinks::{
    ClipSink, EventLog, FileEventLog, GifClipSink, ImageSnapshotSink, Preview, SnapshotKind,
    SnapshotSink,
};
use crate::io::source::FrameSource;
use crate::pipeline::MotionPipeline;
use chrono::{DateTime, Local};
use image::RgbImage;
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

/// External inputs that steer a running loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Quit,
    ManualSnapshot,
}

/// Source of frame timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// The three persistent output collaborators.
pub struct Sinks {
    pub snapshots: Box<dyn SnapshotSink>,
    pub clips: Box<dyn ClipSink>,
    pub log: Box<dyn EventLog>,
}

impl Sinks {
    /// Still-image snapshots, GIF clips and a text event log, all under
    /// `config.output_dir`.
    pub fn on_disk(config: &SentinelConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.output_dir)?;
        let log = FileEventLog::open(&config.log_path())?;
        Ok(Self {
            snapshots: Box::new(ImageSnapshotSink::with_extension(
                &config.output_dir,
                &config.snapshot_format,
            )),
            clips: Box::new(GifClipSink::new(&config.output_dir)),
            log: Box::new(log),
        })
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndOfStream,
    ReadFailure,
    Quit,
}

/// The write a sink result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    EventLog,
    Snapshot,
    ClipOpen,
    ClipFrame,
    ClipClose,
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Output::EventLog => "event log",
            Output::Snapshot => "snapshot",
            Output::ClipOpen => "clip open",
            Output::ClipFrame => "clip frame",
            Output::ClipClose => "clip close",
        })
    }
}

/// Counters for one run, logged when the loop exits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub events: u64,
    pub clips_closed: u64,
    pub motion_snapshots: u64,
    pub manual_snapshots: u64,
    pub sink_failures: u64,
    pub stop_reason: Option<StopReason>,
}

pub struct FrameLoop<S: FrameSource> {
    config: SentinelConfig,
    source: S,
    pipeline: MotionPipeline,
    sinks: Sinks,
    clock: Box<dyn Clock>,
    controls: Option<UnboundedReceiver<ControlEvent>>,
    preview: Option<Box<dyn Preview>>,
    debug_dir: Option<PathBuf>,
    consecutive_failures: u32,
    roi_checked: bool,
    summary: RunSummary,
}

impl<S: FrameSource> FrameLoop<S> {
    pub fn new(config: SentinelConfig, source: S, sinks: Sinks) -> Result<Self> {
        config.validate()?;
        let debug_dir = if config.debug_masks {
            let dir = config.output_dir.join("debug");
            std::fs::create_dir_all(&dir)?;
            Some(dir)
        } else {
            None
        };
        Ok(Self {
            pipeline: MotionPipeline::new(&config),
            config,
            source,
            sinks,
            clock: Box::new(SystemClock),
            controls: None,
            preview: None,
            debug_dir,
            consecutive_failures: 0,
            roi_checked: false,
            summary: RunSummary::default(),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_controls(mut self, controls: UnboundedReceiver<ControlEvent>) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn with_preview(mut self, preview: Box<dyn Preview>) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Runs until the source is exhausted, a read fails, or `Quit` arrives.
    pub fn run(mut self) -> Result<RunSummary> {
        log::info!(
            "Watching {} (clip length {} frames at {} fps)",
            self.source.describe(),
            self.config.clip_frames(),
            self.config.target_fps
        );

        let outcome = self.drive();
        self.finalize();

        self.summary.frames = self.pipeline.frames_processed();
        self.summary.events = self.pipeline.events_started();
        log::info!(
            "Run finished: {} frames, {} events, {} clips, {} sink failures",
            self.summary.frames,
            self.summary.events,
            self.summary.clips_closed,
            self.summary.sink_failures
        );
        if let Ok(json) = serde_json::to_string(&self.summary) {
            log::debug!("run summary: {json}");
        }

        outcome.map(|_| self.summary)
    }

    fn drive(&mut self) -> Result<()> {
        loop {
            // --- 1. Controls ---
            let mut manual = false;
            let mut disconnected = false;
            if let Some(rx) = self.controls.as_mut() {
                loop {
                    match rx.try_recv() {
                        Ok(ControlEvent::Quit) => {
                            log::info!("Stop requested.");
                            self.summary.stop_reason = Some(StopReason::Quit);
                            return Ok(());
                        }
                        Ok(ControlEvent::ManualSnapshot) => manual = true,
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            disconnected = true;
                            break;
                        }
                    }
                }
            }
            if disconnected {
                log::debug!("control channel closed");
                self.controls = None;
            }

            // --- 2. Acquisition ---
            let raw = match self.source.next_frame() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    log::info!("End of stream.");
                    self.summary.stop_reason = Some(StopReason::EndOfStream);
                    return Ok(());
                }
                Err(e) => {
                    log::warn!("Stopping on frame read failure: {e}");
                    self.summary.stop_reason = Some(StopReason::ReadFailure);
                    return Ok(());
                }
            };
            let now = self.clock.now();

            // --- 3. Preparation & Analysis ---
            let color = frame::resize_to_width(raw, self.config.resize_width);
            if !self.roi_checked {
                if let Some(roi) = &self.config.roi {
                    roi.check_fits(color.width(), color.height())?;
                }
                self.roi_checked = true;
            }
            let prepared = frame::prepare(color, self.config.resize_width, self.config.roi.as_ref());
            let report = self.pipeline.process(&prepared, now)?;

            // --- 4. Annotation ---
            let wanted = !report.signals.is_empty() || manual || self.preview.is_some();
            let Some(annotated) =
                wanted.then(|| overlay::annotate(&prepared.color, &report.blobs, now))
            else {
                self.dump_mask(&report.mask);
                continue;
            };

            // --- 5. Dispatch ---
            for signal in &report.signals {
                self.dispatch(signal, &annotated, now)?;
            }
            if manual {
                self.take_snapshot(SnapshotKind::Manual, &annotated, now)?;
            }

            // --- 6. Preview & Debug ---
            if let Some(preview) = self.preview.as_mut() {
                if let Err(e) = preview.show(&annotated, &report.mask) {
                    log::warn!("Preview failed: {e}");
                }
            }
            self.dump_mask(&report.mask);
        }
    }

    fn dump_mask(&self, mask: &image::GrayImage) {
        if let Some(dir) = &self.debug_dir {
            let path = dir.join(format!("mask_{:06}.png", self.pipeline.frames_processed()));
            if let Err(e) = mask.save(&path) {
                log::warn!("Could not write {}: {e}", path.display());
            }
        }
    }

    fn dispatch(&mut self, signal: &EventSignal, annotated: &RgbImage, now: DateTime<Local>) -> Result<()> {
        match signal {
            EventSignal::Start { started_at } => {
                let logged = self.sinks.log.record(now, "Motion detected.");
                self.check_sink(logged, Output::EventLog, now)?;

                self.take_snapshot(SnapshotKind::Motion, annotated, now)?;

                let (width, height) = annotated.dimensions();
                let opened =
                    self.sinks
                        .clips
                        .open(*started_at, self.config.target_fps, width, height);
                if let Ok(path) = &opened {
                    log::debug!("recording to {}", path.display());
                }
                self.check_sink(opened.map(|_| ()), Output::ClipOpen, now)?;
            }
            EventSignal::Frame { .. } => {
                // A clip that failed to open was already reported; skip its frames.
                if self.sinks.clips.is_open() {
                    let appended = self.sinks.clips.append(annotated);
                    self.check_sink(appended, Output::ClipFrame, now)?;
                }
            }
            EventSignal::End { frames, .. } => self.close_clip(*frames, now)?,
        }
        Ok(())
    }

    fn take_snapshot(&mut self, kind: SnapshotKind, annotated: &RgbImage, now: DateTime<Local>) -> Result<()> {
        let saved = self.sinks.snapshots.save(kind, annotated, now);
        if let Ok(path) = &saved {
            match kind {
                SnapshotKind::Motion => self.summary.motion_snapshots += 1,
                SnapshotKind::Manual => {
                    self.summary.manual_snapshots += 1;
                    let logged = self
                        .sinks
                        .log
                        .record(now, &format!("Manual snapshot saved: {}", path.display()));
                    self.check_sink(logged, Output::EventLog, now)?;
                }
            }
        }
        self.check_sink(saved.map(|_| ()), Output::Snapshot, now)
    }

    fn close_clip(&mut self, frames: u64, now: DateTime<Local>) -> Result<()> {
        let closed = self.sinks.clips.close();
        if let Ok(Some(path)) = &closed {
            self.summary.clips_closed += 1;
            let logged = self.sinks.log.record(
                now,
                &format!("Clip saved: {} ({frames} frames)", path.display()),
            );
            self.check_sink(logged, Output::EventLog, now)?;
        }
        self.check_sink(closed.map(|_| ()), Output::ClipClose, now)
    }

    /// Reports a failed write and escalates after too many in a row.
    fn check_sink(
        &mut self,
        result: std::result::Result<(), SinkError>,
        output: Output,
        now: DateTime<Local>,
    ) -> Result<()> {
        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                Ok(())
            }
            Err(e) => {
                self.report_failure(output, &e, now);
                self.summary.sink_failures += 1;
                self.consecutive_failures += 1;
                let limit = self.config.max_sink_failures;
                if limit > 0 && self.consecutive_failures >= limit {
                    Err(SentinelError::TooManySinkFailures(self.consecutive_failures))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Logs a failed write, and notes skipped artifacts in the event log when it is
    /// still writable. A failing event log is only reported to the logger.
    fn report_failure(&mut self, output: Output, e: &SinkError, now: DateTime<Local>) {
        log::error!("{output} write failed: {e}");
        if output == Output::EventLog {
            return;
        }
        if let Err(log_err) = self
            .sinks
            .log
            .record(now, &format!("{output} write failed: {e}"))
        {
            log::error!("event log write failed: {log_err}");
        }
    }

    /// Flushes an open clip and writes the debug background image.
    fn finalize(&mut self) {
        if let Some(EventSignal::End { frames, .. }) = self.pipeline.finish() {
            log::info!("Finalizing open clip after {frames} frames.");
            let now = self.clock.now();
            if let Err(e) = self.close_clip(frames, now) {
                log::error!("{e}");
            }
        } else if self.sinks.clips.is_open() {
            // Only reachable when a failed close left the sink open.
            if let Err(e) = self.sinks.clips.close() {
                let now = self.clock.now();
                self.report_failure(Output::ClipClose, &e, now);
            }
        }

        if let (Some(dir), Some(background)) =
            (&self.debug_dir, self.pipeline.background_model().background_image())
        {
            let path = dir.join("background.png");
            if let Err(e) = background.save(&path) {
                log::warn!("Could not write {}: {e}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, SourceError};
    use crate::io::source::FrameQueue;
    use chrono::TimeZone;
    use image::Rgb;
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};

    /// Ticks one second per frame from a fixed start.
    struct StepClock {
        next: Cell<i64>,
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Local> {
            let second = self.next.get();
            self.next.set(second + 1);
            Local
                .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
                .single()
                .expect("unambiguous time")
                + chrono::Duration::seconds(second)
        }
    }

    fn step_clock() -> StepClock {
        StepClock { next: Cell::new(0) }
    }

    #[derive(Default)]
    struct Journal {
        entries: Vec<String>,
    }

    type Shared = Arc<Mutex<Journal>>;

    fn note(journal: &Shared, entry: String) {
        journal.lock().expect("journal lock").entries.push(entry);
    }

    struct RecordingSnapshots(Shared, bool);
    impl SnapshotSink for RecordingSnapshots {
        fn save(&mut self, kind: SnapshotKind, _: &RgbImage, _: DateTime<Local>) -> std::result::Result<PathBuf, SinkError> {
            if self.1 {
                note(&self.0, format!("snapshot-failed {}", kind.prefix()));
                return Err(SinkError::Backend("disk full".into()));
            }
            note(&self.0, format!("snapshot {}", kind.prefix()));
            Ok(PathBuf::from(kind.prefix()))
        }
    }

    struct RecordingClips(Shared, bool);
    impl ClipSink for RecordingClips {
        fn open(&mut self, _: DateTime<Local>, _: f64, _: u32, _: u32) -> std::result::Result<PathBuf, SinkError> {
            self.1 = true;
            note(&self.0, "open".into());
            Ok(PathBuf::from("clip"))
        }
        fn append(&mut self, _: &RgbImage) -> std::result::Result<(), SinkError> {
            note(&self.0, "append".into());
            Ok(())
        }
        fn close(&mut self) -> std::result::Result<Option<PathBuf>, SinkError> {
            if !std::mem::replace(&mut self.1, false) {
                return Ok(None);
            }
            note(&self.0, "close".into());
            Ok(Some(PathBuf::from("clip")))
        }
        fn is_open(&self) -> bool {
            self.1
        }
    }

    struct RecordingLog(Shared);
    impl EventLog for RecordingLog {
        fn record(&mut self, _: DateTime<Local>, message: &str) -> std::result::Result<(), SinkError> {
            note(&self.0, format!("log {message}"));
            Ok(())
        }
    }

    fn sinks(journal: &Shared, failing_snapshots: bool) -> Sinks {
        Sinks {
            snapshots: Box::new(RecordingSnapshots(journal.clone(), failing_snapshots)),
            clips: Box::new(RecordingClips(journal.clone(), false)),
            log: Box::new(RecordingLog(journal.clone())),
        }
    }

    /// `idle` dark frames, then `moving` frames with a square at a fresh spot each time.
    fn wandering(idle: usize, moving: usize) -> FrameQueue {
        let dark = RgbImage::from_pixel(260, 60, Rgb([0, 0, 0]));
        let mut queue = FrameQueue::new(std::iter::repeat_n(dark.clone(), idle));
        for i in 0..moving as u32 {
            let mut lit = dark.clone();
            for y in 15..45 {
                for x in 5 + 42 * i..35 + 42 * i {
                    lit.put_pixel(x, y, Rgb([255, 255, 255]));
                }
            }
            queue.push(lit);
        }
        queue
    }

    fn frames(idle: usize, moving: usize) -> FrameQueue {
        let dark = RgbImage::from_pixel(80, 60, Rgb([0, 0, 0]));
        let mut lit = dark.clone();
        for y in 10..40 {
            for x in 20..50 {
                lit.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        FrameQueue::new(
            std::iter::repeat_n(dark, idle).chain(std::iter::repeat_n(lit, moving)),
        )
    }

    fn config() -> SentinelConfig {
        SentinelConfig {
            min_area: 400,
            resize_width: 80,
            clip_seconds: 1.0,
            target_fps: 4.0,
            ..SentinelConfig::default()
        }
    }

    fn entries(journal: &Shared) -> Vec<String> {
        journal.lock().expect("journal lock").entries.clone()
    }

    #[test]
    fn idle_stream_touches_no_sink() {
        let journal = Shared::default();
        let summary = FrameLoop::new(config(), frames(12, 0), sinks(&journal, false))
            .expect("loop")
            .with_clock(step_clock())
            .run()
            .expect("run");

        assert_eq!(summary.frames, 12);
        assert_eq!(summary.events, 0);
        assert_eq!(summary.stop_reason, Some(StopReason::EndOfStream));
        assert!(entries(&journal).is_empty());
    }

    #[test]
    fn motion_opens_fills_and_closes_a_clip() {
        let journal = Shared::default();
        let summary = FrameLoop::new(config(), frames(5, 3), sinks(&journal, false))
            .expect("loop")
            .with_clock(step_clock())
            .run()
            .expect("run");

        assert_eq!(summary.events, 1);
        assert_eq!(summary.motion_snapshots, 1);
        assert_eq!(summary.clips_closed, 1);
        // Three frames recorded, then the open clip is finalized at end of stream.
        assert_eq!(
            entries(&journal),
            vec![
                "log Motion detected.",
                "snapshot motion",
                "open",
                "append",
                "append",
                "append",
                "close",
                "log Clip saved: clip (3 frames)",
            ]
        );
    }

    #[test]
    fn quit_and_manual_snapshot_controls() {
        let journal = Shared::default();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(ControlEvent::ManualSnapshot).expect("send");

        let mut source = frames(3, 0);
        source.push(RgbImage::new(80, 60));
        let frame_loop = FrameLoop::new(config(), source, sinks(&journal, false))
            .expect("loop")
            .with_clock(step_clock())
            .with_controls(rx);
        tx.send(ControlEvent::Quit).expect("send");

        let summary = frame_loop.run().expect("run");
        // Both events are drained before the first frame; quit wins.
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.stop_reason, Some(StopReason::Quit));
        assert!(entries(&journal).is_empty());
    }

    #[test]
    fn manual_snapshot_is_taken_outside_the_state_machine() {
        let journal = Shared::default();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(ControlEvent::ManualSnapshot).expect("send");
        drop(tx);

        let summary = FrameLoop::new(config(), frames(2, 0), sinks(&journal, false))
            .expect("loop")
            .with_clock(step_clock())
            .with_controls(rx)
            .run()
            .expect("run");

        assert_eq!(summary.manual_snapshots, 1);
        assert_eq!(summary.events, 0);
        assert_eq!(
            entries(&journal),
            vec!["snapshot manual", "log Manual snapshot saved: manual"]
        );
    }

    #[test]
    fn sink_failures_are_skipped_then_escalated() {
        let journal = Shared::default();
        let mut tolerant = config();
        tolerant.resize_width = 260;
        tolerant.clip_seconds = 0.25;
        tolerant.max_sink_failures = 0;
        let summary = FrameLoop::new(tolerant.clone(), wandering(2, 6), sinks(&journal, true))
            .expect("loop")
            .with_clock(step_clock())
            .run()
            .expect("failures are not fatal");
        // One-frame clips: every moving frame starts an event whose snapshot fails.
        assert_eq!(summary.events, 6);
        assert_eq!(summary.sink_failures, 6);
        assert_eq!(summary.clips_closed, 6);

        let mut strict = tolerant;
        strict.max_sink_failures = 1;
        let journal = Shared::default();
        let outcome = FrameLoop::new(strict, wandering(2, 6), sinks(&journal, true))
            .expect("loop")
            .with_clock(step_clock())
            .run();
        assert!(matches!(outcome, Err(SentinelError::TooManySinkFailures(1))));
        assert_eq!(
            entries(&journal),
            vec![
                "log Motion detected.",
                "snapshot-failed motion",
                "log snapshot write failed: disk full",
            ]
        );
    }

    #[test]
    fn skipped_snapshots_are_noted_in_the_event_log() {
        let journal = Shared::default();
        let mut config = config();
        config.max_sink_failures = 0;
        let summary = FrameLoop::new(config, frames(5, 3), sinks(&journal, true))
            .expect("loop")
            .with_clock(step_clock())
            .run()
            .expect("run");

        assert_eq!(summary.sink_failures, 1);
        assert_eq!(summary.motion_snapshots, 0);
        assert_eq!(summary.clips_closed, 1);
        assert_eq!(
            &entries(&journal)[..4],
            &[
                "log Motion detected.",
                "snapshot-failed motion",
                "log snapshot write failed: disk full",
                "open",
            ]
        );
    }

    /// Hands out queued frames, then fails every read.
    struct BrokenAfter(FrameQueue);
    impl FrameSource for BrokenAfter {
        fn next_frame(&mut self) -> std::result::Result<Option<RgbImage>, SourceError> {
            match self.0.next_frame()? {
                Some(frame) => Ok(Some(frame)),
                None => Err(SourceError::Read("truncated stream".into())),
            }
        }
        fn describe(&self) -> String {
            "broken".into()
        }
    }

    #[test]
    fn read_failure_mid_clip_ends_the_run_and_saves_the_clip() {
        let journal = Shared::default();
        let summary = FrameLoop::new(config(), BrokenAfter(frames(5, 2)), sinks(&journal, false))
            .expect("loop")
            .with_clock(step_clock())
            .run()
            .expect("a read failure is a normal stop");

        assert_eq!(summary.stop_reason, Some(StopReason::ReadFailure));
        assert_eq!(summary.frames, 7);
        assert_eq!(summary.clips_closed, 1);
        let entries = entries(&journal);
        assert_eq!(entries.iter().filter(|e| *e == "append").count(), 2);
        assert_eq!(entries.last().map(String::as_str), Some("log Clip saved: clip (2 frames)"));
    }

    #[test]
    fn frame_size_change_mid_clip_is_fatal_after_closing_the_clip() {
        let journal = Shared::default();
        let mut source = frames(5, 1);
        source.push(RgbImage::new(80, 50));
        let outcome = FrameLoop::new(config(), source, sinks(&journal, false))
            .expect("loop")
            .with_clock(step_clock())
            .run();

        assert!(matches!(
            outcome,
            Err(SentinelError::Pipeline(PipelineError::FrameSizeMismatch {
                width: 80,
                height: 60,
                got_width: 80,
                got_height: 50,
            }))
        ));
        // The mismatched frame never reaches the clip.
        assert_eq!(
            entries(&journal),
            vec![
                "log Motion detected.",
                "snapshot motion",
                "open",
                "append",
                "close",
                "log Clip saved: clip (1 frames)",
            ]
        );
    }

    #[test]
    fn roi_outside_the_frame_is_rejected_on_the_first_frame() {
        let journal = Shared::default();
        let mut config = config();
        config.roi = Some(crate::config::Roi::new(60, 40, 40, 40));
        let outcome = FrameLoop::new(config, frames(3, 0), sinks(&journal, false))
            .expect("loop")
            .run();
        assert!(matches!(
            outcome,
            Err(SentinelError::Config(crate::error::ConfigError::RoiOutOfBounds { .. }))
        ));
    }
}
