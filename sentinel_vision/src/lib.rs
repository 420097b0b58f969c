// THEORY:
// This file is the main entry point for the `sentinel_vision` library crate.
// It defines the public API exposed to runners such as `sentinel_cam`.
//
// The engine is layered the same way a single frame travels through it:
// `core_modules` holds the four analysis stages (background model, mask filter,
// blob extractor, event controller) plus frame preparation; `pipeline` chains them
// into one call per frame; `frame_loop` drives the pipeline against a frame source
// and forwards its signals to the output collaborators in `io`. Everything a run
// needs is carried in one immutable `SentinelConfig`.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod frame_loop;
pub mod io;
pub mod pipeline;

pub use config::{BackgroundConfig, Roi, SentinelConfig, SourceSpec};
pub use core_modules::blob::{Blob, BoundingBox, Point};
pub use core_modules::event_controller::{EventSignal, EventState, MotionEvent};
pub use error::{ConfigError, PipelineError, Result, SentinelError, SinkError, SourceError};
pub use frame_loop::{Clock, ControlEvent, FrameLoop, RunSummary, Sinks, StopReason, SystemClock};
pub use pipeline::{FrameReport, MotionPipeline};
