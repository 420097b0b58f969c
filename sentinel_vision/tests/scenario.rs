use chrono::{DateTime, Local, TimeZone};
use image::{Rgb, RgbImage};
use sentinel_vision::core_modules::frame::prepare;
use sentinel_vision::io::{FrameQueue, FrameSource};
use sentinel_vision::{
    Clock, ControlEvent, EventSignal, FrameLoop, MotionPipeline, SentinelConfig, Sinks,
    SourceError, StopReason,
};
use std::cell::Cell;
use std::path::Path;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;

fn black() -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([0, 0, 0]))
}

fn with_square(x0: u32, y0: u32, side: u32) -> RgbImage {
    let mut frame = black();
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            frame.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    frame
}

fn config(output_dir: &Path, min_area: u32) -> SentinelConfig {
    SentinelConfig {
        output_dir: output_dir.to_path_buf(),
        min_area,
        resize_width: WIDTH,
        clip_seconds: 1.0,
        target_fps: 5.0,
        ..SentinelConfig::default()
    }
}

fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read output dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}

struct StepClock(Cell<i64>);

impl Clock for StepClock {
    fn now(&self) -> DateTime<Local> {
        let second = self.0.get();
        self.0.set(second + 1);
        Local
            .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
            .single()
            .expect("unambiguous time")
            + chrono::Duration::seconds(second)
    }
}

#[test]
fn square_on_static_background_starts_exactly_one_event() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config(dir.path(), 500);
    let mut pipeline = MotionPipeline::new(&config);
    let now = Local::now();

    for _ in 0..10 {
        let report = pipeline
            .process(&prepare(black(), WIDTH, None), now)
            .expect("process");
        assert!(report.blobs.is_empty());
        assert!(report.signals.is_empty());
    }
    assert_eq!(pipeline.events_started(), 0);

    let report = pipeline
        .process(&prepare(with_square(50, 40, 40), WIDTH, None), now)
        .expect("process");
    assert_eq!(report.blobs.len(), 1);
    assert!(report.blobs[0].area > 500);
    assert!(matches!(report.signals[0], EventSignal::Start { .. }));
    assert_eq!(pipeline.events_started(), 1);
}

#[test]
fn clip_closes_after_exactly_clip_frames_frames() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A 30x30 square loses its 12 corner pixels to the median filter: 888 = 2 x 444.
    let config = config(dir.path(), 444);
    let clip_frames = config.clip_frames();
    assert_eq!(clip_frames, 5);

    let idle = 8;
    let moving = 12;
    let mut pipeline = MotionPipeline::new(&config);
    let now = Local::now();
    let mut starts = Vec::new();
    let mut ends = Vec::new();

    for i in 0..idle + moving {
        let raw = if i < idle {
            black()
        } else {
            with_square(60, 45, 30)
        };
        let report = pipeline
            .process(&prepare(raw, WIDTH, None), now)
            .expect("process");
        if i == idle {
            assert_eq!(report.blobs[0].area, 2 * 444);
        }
        for signal in report.signals {
            match signal {
                EventSignal::Start { .. } => starts.push(i),
                EventSignal::End { frames, .. } => {
                    assert_eq!(frames, clip_frames);
                    ends.push(i);
                }
                EventSignal::Frame { .. } => {}
            }
        }
    }

    assert_eq!(starts.first(), Some(&idle));
    assert_eq!(ends.first(), Some(&(idle + clip_frames as usize - 1)));
}

#[test]
fn full_run_writes_snapshot_clip_and_log() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config(dir.path(), 500);
    let frames = std::iter::repeat_n(black(), 10)
        .chain(std::iter::repeat_n(with_square(50, 40, 40), 7));

    let sinks = Sinks::on_disk(&config).expect("sinks");
    let summary = FrameLoop::new(config.clone(), FrameQueue::new(frames), sinks)
        .expect("loop")
        .with_clock(StepClock(Cell::new(0)))
        .run()
        .expect("run");

    assert_eq!(summary.frames, 17);
    assert_eq!(summary.events, 1);
    assert_eq!(summary.stop_reason, Some(StopReason::EndOfStream));

    // Frame 11 is the first with motion, stamped 08:00:10.
    assert_eq!(
        files_with_prefix(dir.path(), "motion_"),
        vec!["motion_2024-06-01_08-00-10.jpg"]
    );
    let clips = files_with_prefix(dir.path(), "clip_");
    assert_eq!(clips, vec!["clip_2024-06-01_08-00-10.gif"]);

    let snapshot = image::open(dir.path().join("motion_2024-06-01_08-00-10.jpg")).expect("snapshot");
    assert_eq!((snapshot.width(), snapshot.height()), (WIDTH, HEIGHT));

    let log = std::fs::read_to_string(config.log_path()).expect("log");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines[0], "2024-06-01 08:00:10 - Motion detected.");
    assert!(lines[1].ends_with("(5 frames)"), "{}", lines[1]);
}

/// Sends `Quit` once it has handed out `quit_after` frames.
struct QuittingSource {
    inner: FrameQueue,
    served: usize,
    quit_after: usize,
    controls: UnboundedSender<ControlEvent>,
}

impl FrameSource for QuittingSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        self.served += 1;
        if self.served == self.quit_after {
            self.controls
                .send(ControlEvent::Quit)
                .map_err(|e| SourceError::Read(e.to_string()))?;
        }
        self.inner.next_frame()
    }

    fn describe(&self) -> String {
        "quitting source".into()
    }
}

#[test]
fn quit_finalizes_the_open_clip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config(dir.path(), 500);
    config.clip_seconds = 60.0;

    let (tx, rx) = unbounded_channel();
    let source = QuittingSource {
        inner: FrameQueue::new(
            std::iter::repeat_n(black(), 5).chain(std::iter::repeat_n(with_square(50, 40, 40), 20)),
        ),
        served: 0,
        quit_after: 8,
        controls: tx,
    };

    let sinks = Sinks::on_disk(&config).expect("sinks");
    let summary = FrameLoop::new(config.clone(), source, sinks)
        .expect("loop")
        .with_controls(rx)
        .run()
        .expect("run");

    assert_eq!(summary.stop_reason, Some(StopReason::Quit));
    assert_eq!(summary.frames, 8);
    assert_eq!(summary.clips_closed, 1);

    let clips = files_with_prefix(dir.path(), "clip_");
    assert_eq!(clips.len(), 1);
    let clip = image::open(dir.path().join(&clips[0])).expect("decode clip");
    assert_eq!((clip.width(), clip.height()), (WIDTH, HEIGHT));

    let log = std::fs::read_to_string(config.log_path()).expect("log");
    assert!(log.contains("Motion detected."));
    assert!(log.contains("(3 frames)"));
}
