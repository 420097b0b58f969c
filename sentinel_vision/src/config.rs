// THEORY:
// One immutable value describes a whole run. It is assembled once at startup
// (defaults, then an optional JSON file, then command-line overrides), validated,
// and passed by reference into every stage. Nothing in the engine reads ambient
// global state.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hard upper bound on Gaussian components per pixel.
pub const MAX_COMPONENTS: usize = 5;

/// Snapshot extensions the `image` encoders handle for RGB frames.
pub const SNAPSHOT_FORMATS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    /// A capture device index (requires the `opencv` backend in the runner).
    Device(u32),
    /// A video file (requires the `opencv` backend in the runner).
    File(PathBuf),
    /// A directory of still images, read in file-name order.
    Images(PathBuf),
}

/// A sub-rectangle of the resized frame to which analysis is restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Checks that the rectangle lies fully inside a `width`x`height` frame.
    pub fn check_fits(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        let fits = self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height);
        if fits {
            Ok(())
        } else {
            Err(ConfigError::RoiOutOfBounds {
                roi: (self.x, self.y, self.width, self.height),
                width,
                height,
            })
        }
    }
}

/// Tuning for the per-pixel Gaussian mixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Number of frames the model effectively remembers. The learning rate is `1/history`
    /// once the model is older than `history / 2` frames.
    pub history: u32,
    /// Squared number of standard deviations within which a value matches a component.
    pub var_threshold: f32,
    /// Components kept per pixel.
    pub max_components: usize,
    /// Fraction of total weight that counts as background.
    pub background_ratio: f32,
    /// Variance given to freshly created components.
    pub var_init: f32,
    pub var_min: f32,
    pub var_max: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 100.0,
            max_components: MAX_COMPONENTS,
            background_ratio: 0.9,
            var_init: 15.0,
            var_min: 4.0,
            var_max: 75.0,
        }
    }
}

/// The full, immutable configuration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    pub source: SourceSpec,
    /// Directory receiving snapshots, clips, the event log and debug dumps.
    pub output_dir: PathBuf,
    /// Blobs must be strictly larger than this many pixels.
    pub min_area: u32,
    /// Frames are resized to this width (aspect ratio preserved) before analysis.
    pub resize_width: u32,
    pub roi: Option<Roi>,
    pub clip_seconds: f64,
    pub target_fps: f64,
    /// Side of the square median window applied to the raw mask.
    pub median_kernel: u32,
    pub background: BackgroundConfig,
    /// Consecutive sink failures tolerated before the run aborts. 0 never aborts.
    pub max_sink_failures: u32,
    /// File name of the event log inside `output_dir`.
    pub log_file: String,
    /// Snapshot file extension; it also picks the encoder.
    pub snapshot_format: String,
    /// Dump filtered masks and the background image into `output_dir/debug`.
    pub debug_masks: bool,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            source: SourceSpec::File(PathBuf::from("sample/footage.mp4")),
            output_dir: PathBuf::from("events"),
            min_area: 1000,
            resize_width: 800,
            roi: None,
            clip_seconds: 10.0,
            target_fps: 20.0,
            median_kernel: 5,
            background: BackgroundConfig::default(),
            max_sink_failures: 25,
            log_file: String::from("motion_log.txt"),
            snapshot_format: String::from("jpg"),
            debug_masks: false,
        }
    }
}

impl SentinelConfig {
    /// Reads a JSON config file. Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Number of frames in one clip: `clip_seconds * target_fps`, at least one.
    pub fn clip_frames(&self) -> u64 {
        (self.clip_seconds * self.target_fps).round().max(1.0) as u64
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize_width == 0 {
            return Err(ConfigError::NotPositive { field: "resize_width" });
        }
        if !(self.clip_seconds > 0.0) {
            return Err(ConfigError::NotPositive { field: "clip_seconds" });
        }
        if !(self.target_fps > 0.0) {
            return Err(ConfigError::NotPositive { field: "target_fps" });
        }
        if self.median_kernel == 0 {
            return Err(ConfigError::NotPositive { field: "median_kernel" });
        }
        if self.median_kernel % 2 == 0 {
            return Err(ConfigError::EvenKernel(self.median_kernel));
        }
        if let Some(roi) = &self.roi {
            if roi.width == 0 || roi.height == 0 {
                return Err(ConfigError::EmptyRoi);
            }
        }
        if !SNAPSHOT_FORMATS.contains(&self.snapshot_format.as_str()) {
            return Err(ConfigError::SnapshotFormat(self.snapshot_format.clone()));
        }

        let bg = &self.background;
        if bg.history == 0 {
            return Err(ConfigError::NotPositive { field: "background.history" });
        }
        if !(bg.var_threshold > 0.0) {
            return Err(ConfigError::NotPositive { field: "background.var_threshold" });
        }
        if bg.max_components == 0 || bg.max_components > MAX_COMPONENTS {
            return Err(ConfigError::ComponentCount {
                got: bg.max_components,
                max: MAX_COMPONENTS,
            });
        }
        if !(bg.background_ratio > 0.0 && bg.background_ratio <= 1.0) {
            return Err(ConfigError::BackgroundRatio(bg.background_ratio));
        }
        if !(bg.var_min > 0.0 && bg.var_min <= bg.var_init && bg.var_init <= bg.var_max) {
            return Err(ConfigError::VarianceBounds {
                min: bg.var_min,
                init: bg.var_init,
                max: bg.var_max,
            });
        }
        Ok(())
    }
}
