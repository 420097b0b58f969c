// Error taxonomy for the sentinel engine.
//
// Only two kinds of failure are allowed to stop a run: a source that cannot be
// opened, and a pipeline that is fed something it cannot model. Everything on the
// output side (snapshots, clips, log lines) is a `SinkError`, which the frame loop
// reports and skips.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("median_kernel must be odd, got {0}")]
    EvenKernel(u32),

    #[error("background.max_components must be between 1 and {max}, got {got}")]
    ComponentCount { got: usize, max: usize },

    #[error("background.background_ratio must be in (0, 1], got {0}")]
    BackgroundRatio(f32),

    #[error("background variance bounds are inconsistent (min {min}, init {init}, max {max})")]
    VarianceBounds { min: f32, init: f32, max: f32 },

    #[error("snapshot_format must be one of jpg, jpeg, png or bmp, got {0:?}")]
    SnapshotFormat(String),

    #[error("region of interest has zero area")]
    EmptyRoi,

    #[error("region of interest {roi:?} does not fit inside a {width}x{height} frame")]
    RoiOutOfBounds {
        roi: (u32, u32, u32, u32),
        width: u32,
        height: u32,
    },

    #[error("failed to read config file {path}: {message}")]
    File { path: PathBuf, message: String },
}

/// Failures of the frame source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("frame source unavailable: {0}")]
    Unavailable(String),

    #[error("frame read failed: {0}")]
    Read(String),

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures of a snapshot, clip or log write. Never fatal on their own.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("no clip is open")]
    ClipNotOpen,

    #[error("{0}")]
    Backend(String),
}

/// Failures inside the analysis stages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("frame is {got_width}x{got_height}, model was built for {width}x{height}")]
    FrameSizeMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("frame has zero area")]
    EmptyFrame,
}

/// Top-level error returned by a run.
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("output error: {0}")]
    Sink(#[from] SinkError),

    #[error("aborting after {0} consecutive sink failures")]
    TooManySinkFailures(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SentinelError>;
