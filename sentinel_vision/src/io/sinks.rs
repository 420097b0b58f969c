// THEORY:
// Output collaborators. Each trait covers one kind of artifact the frame loop emits:
//
// 1.  **SnapshotSink**: one still image per motion start or manual request, named
//     `{prefix}_{YYYY-MM-DD_HH-MM-SS}.{ext}`.
// 2.  **ClipSink**: one clip file per motion event, `clip_{YYYY-MM-DD_HH-MM-SS}.{ext}`,
//     opened on `Start`, fed on every `Frame` and closed on `End`.
// 3.  **EventLog**: one `{YYYY-MM-DD HH:MM:SS} - {message}` line per transition,
//     persisted and mirrored to the console.
// 4.  **Preview**: an optional live view of the annotated frame and its mask.
//
// Every write returns a `SinkError` on failure. Whether that failure matters is the
// frame loop's decision, not the sink's.

use crate::error::SinkError;
use chrono::{DateTime, Local};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{DynamicImage, GrayImage, RgbImage};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Why a snapshot was taken. Decides the file-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Motion,
    Manual,
}

impl SnapshotKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            SnapshotKind::Motion => "motion",
            SnapshotKind::Manual => "manual",
        }
    }
}

/// `YYYY-MM-DD_HH-MM-SS`, safe for file names.
pub fn file_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// `YYYY-MM-DD HH:MM:SS`, as used in the event log and the overlay.
pub fn log_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn snapshot_file_name(kind: SnapshotKind, at: DateTime<Local>, extension: &str) -> String {
    format!("{}_{}.{}", kind.prefix(), file_timestamp(at), extension)
}

pub fn clip_file_name(at: DateTime<Local>, extension: &str) -> String {
    format!("clip_{}.{}", file_timestamp(at), extension)
}

pub trait SnapshotSink {
    /// Persists `frame` and returns the path written.
    fn save(
        &mut self,
        kind: SnapshotKind,
        frame: &RgbImage,
        at: DateTime<Local>,
    ) -> Result<PathBuf, SinkError>;
}

pub trait ClipSink {
    /// Starts a new clip. A clip that is still open is closed first.
    fn open(
        &mut self,
        started_at: DateTime<Local>,
        fps: f64,
        width: u32,
        height: u32,
    ) -> Result<PathBuf, SinkError>;

    fn append(&mut self, frame: &RgbImage) -> Result<(), SinkError>;

    /// Flushes and closes the open clip. Returns its path, or `None` if nothing was open.
    fn close(&mut self) -> Result<Option<PathBuf>, SinkError>;

    fn is_open(&self) -> bool;
}

pub trait EventLog {
    fn record(&mut self, at: DateTime<Local>, message: &str) -> Result<(), SinkError>;
}

pub trait Preview {
    fn show(&mut self, annotated: &RgbImage, mask: &GrayImage) -> Result<(), SinkError>;
}

/// Writes snapshots as still images; the encoder is picked from the extension.
pub struct ImageSnapshotSink {
    dir: PathBuf,
    extension: String,
}

impl ImageSnapshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extension(dir, "jpg")
    }

    pub fn with_extension(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.to_string(),
        }
    }
}

impl SnapshotSink for ImageSnapshotSink {
    fn save(
        &mut self,
        kind: SnapshotKind,
        frame: &RgbImage,
        at: DateTime<Local>,
    ) -> Result<PathBuf, SinkError> {
        // Two snapshots of the same kind within one second share a name; the later wins.
        let path = self.dir.join(snapshot_file_name(kind, at, &self.extension));
        frame.save(&path)?;
        Ok(path)
    }
}

struct OpenGif {
    encoder: GifEncoder<BufWriter<File>>,
    path: PathBuf,
    delay: image::Delay,
    dimensions: (u32, u32),
    frames: u64,
}

/// Encodes each motion event as a looping animated GIF.
pub struct GifClipSink {
    dir: PathBuf,
    /// NeuQuant speed, 1 (best) to 30 (fastest).
    speed: i32,
    current: Option<OpenGif>,
}

impl GifClipSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            speed: 20,
            current: None,
        }
    }
}

impl ClipSink for GifClipSink {
    fn open(
        &mut self,
        started_at: DateTime<Local>,
        fps: f64,
        width: u32,
        height: u32,
    ) -> Result<PathBuf, SinkError> {
        if self.current.is_some() {
            self.close()?;
        }

        let path = self.dir.join(clip_file_name(started_at, "gif"));
        let writer = BufWriter::new(File::create(&path)?);
        let mut encoder = GifEncoder::new_with_speed(writer, self.speed);
        encoder.set_repeat(Repeat::Infinite)?;

        let fps = fps.round().max(1.0) as u32;
        self.current = Some(OpenGif {
            encoder,
            path: path.clone(),
            delay: image::Delay::from_numer_denom_ms(1000, fps),
            dimensions: (width, height),
            frames: 0,
        });
        Ok(path)
    }

    fn append(&mut self, frame: &RgbImage) -> Result<(), SinkError> {
        let clip = self.current.as_mut().ok_or(SinkError::ClipNotOpen)?;
        if frame.dimensions() != clip.dimensions {
            return Err(SinkError::Backend(format!(
                "frame is {}x{}, clip was opened at {}x{}",
                frame.width(),
                frame.height(),
                clip.dimensions.0,
                clip.dimensions.1
            )));
        }
        let rgba = DynamicImage::ImageRgb8(frame.clone()).into_rgba8();
        clip.encoder
            .encode_frame(image::Frame::from_parts(rgba, 0, 0, clip.delay))?;
        clip.frames += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<Option<PathBuf>, SinkError> {
        let Some(clip) = self.current.take() else {
            return Ok(None);
        };
        log::debug!("closing {} after {} frame(s)", clip.path.display(), clip.frames);
        // Dropping the encoder writes the GIF trailer and flushes the writer.
        drop(clip.encoder);
        Ok(Some(clip.path))
    }

    fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

/// Appends event lines to a text file and mirrors them to the `log` facade.
pub struct FileEventLog {
    file: File,
}

impl FileEventLog {
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl EventLog for FileEventLog {
    fn record(&mut self, at: DateTime<Local>, message: &str) -> Result<(), SinkError> {
        let line = format!("{} - {}", log_timestamp(at), message);
        log::info!("{line}");
        writeln!(self.file, "{line}")?;
        Ok(())
    }
}
