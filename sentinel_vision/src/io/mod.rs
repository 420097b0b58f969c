// THEORY:
// The `io` module holds the edges of the engine: where frames come from, where
// snapshots, clips and log lines go, and how a frame is annotated for humans. The
// frame loop only sees the traits defined here, so a runner can swap any of them
// (the `sentinel_cam` binary plugs in OpenCV capture and MP4 encoding this way).

pub mod overlay;
pub mod sinks;
pub mod source;

pub use sinks::{
    ClipSink, EventLog, FileEventLog, GifClipSink, ImageSnapshotSink, Preview, SnapshotKind,
    SnapshotSink,
};
pub use source::{FrameQueue, FrameSource, ImageSequenceSource};
