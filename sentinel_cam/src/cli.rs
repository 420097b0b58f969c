// Command-line surface. Flags override values from an optional JSON config file,
// which in turn overrides the built-in defaults.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sentinel_vision::{Roi, SentinelConfig, SourceSpec};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClipFormat {
    /// Animated GIF, always available.
    Gif,
    /// MPEG-4 via OpenCV (`opencv` feature).
    Mp4,
}

#[derive(Debug, Parser)]
#[command(name = "sentinel_cam")]
#[command(about = "Watches a camera, video file or image folder and records motion events", long_about = None)]
#[command(version)]
pub struct Args {
    /// Device index, video file, or directory of still images
    pub source: Option<String>,

    /// JSON config file; command-line flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for snapshots, clips and the event log
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Blobs must be strictly larger than this many pixels
    #[arg(long)]
    pub min_area: Option<u32>,

    /// Analysis width in pixels
    #[arg(long)]
    pub resize_width: Option<u32>,

    /// Region of interest as x,y,width,height in resized-frame pixels
    #[arg(long, value_parser = parse_roi)]
    pub roi: Option<Roi>,

    /// Clip length in seconds
    #[arg(long)]
    pub clip_seconds: Option<f64>,

    /// Clip frame rate
    #[arg(long)]
    pub fps: Option<f64>,

    /// Median filter window (odd)
    #[arg(long)]
    pub median_kernel: Option<u32>,

    /// Background model history in frames
    #[arg(long)]
    pub history: Option<u32>,

    /// Squared Mahalanobis distance for a background match
    #[arg(long)]
    pub var_threshold: Option<f32>,

    /// Consecutive write failures before giving up (0 = never)
    #[arg(long)]
    pub max_sink_failures: Option<u32>,

    /// Dump filtered masks and the learned background into <output_dir>/debug
    #[arg(long)]
    pub debug_masks: bool,

    #[arg(long, value_enum, default_value_t = ClipFormat::Gif)]
    pub clip_format: ClipFormat,

    /// Snapshot image type: jpg, jpeg, png or bmp
    #[arg(long)]
    pub snapshot_format: Option<String>,

    /// Show a live window (`opencv` feature); q quits, s takes a snapshot
    #[arg(long)]
    pub preview: bool,

    /// Do not read q / s commands from standard input
    #[arg(long)]
    pub no_stdin: bool,
}

fn parse_roi(raw: &str) -> std::result::Result<Roi, String> {
    let parts: Vec<u32> = raw
        .split(',')
        .map(|p| p.trim().parse::<u32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<std::result::Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, width, height] => Ok(Roi::new(*x, *y, *width, *height)),
        _ => Err(format!("expected x,y,width,height, got {raw:?}")),
    }
}

/// A bare number is a device index, a directory is an image sequence, anything else
/// is treated as a video file.
pub fn parse_source(raw: &str) -> SourceSpec {
    if let Ok(index) = raw.parse::<u32>() {
        return SourceSpec::Device(index);
    }
    let path = Path::new(raw);
    if path.is_dir() {
        SourceSpec::Images(path.to_path_buf())
    } else {
        SourceSpec::File(path.to_path_buf())
    }
}

impl Args {
    /// Builds the run configuration: defaults, then the config file, then flags.
    pub fn resolve(&self) -> Result<SentinelConfig> {
        let mut config = match &self.config {
            Some(path) => SentinelConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SentinelConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source = parse_source(source);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(v) = self.min_area {
            config.min_area = v;
        }
        if let Some(v) = self.resize_width {
            config.resize_width = v;
        }
        if let Some(roi) = self.roi {
            config.roi = Some(roi);
        }
        if let Some(v) = self.clip_seconds {
            config.clip_seconds = v;
        }
        if let Some(v) = self.fps {
            config.target_fps = v;
        }
        if let Some(v) = self.median_kernel {
            config.median_kernel = v;
        }
        if let Some(v) = self.history {
            config.background.history = v;
        }
        if let Some(v) = self.var_threshold {
            config.background.var_threshold = v;
        }
        if let Some(v) = self.max_sink_failures {
            config.max_sink_failures = v;
        }
        if let Some(format) = &self.snapshot_format {
            config.snapshot_format = format.to_ascii_lowercase();
        }
        config.debug_masks |= self.debug_masks;

        config.validate()?;
        Ok(config)
    }
}
