// Frame sources. A source hands out raw RGB frames in acquisition order until it runs
// dry; `Ok(None)` is a normal end of stream, an `Err` is a failed read.

use crate::error::SourceError;
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Anything that can supply frames to the frame loop.
pub trait FrameSource {
    /// Returns the next frame, or `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError>;

    /// A short human-readable description for log lines.
    fn describe(&self) -> String;
}

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Reads a directory of still images in file-name order.
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    /// Lists the image files in `dir`. Fails when the directory cannot be read or holds
    /// no images.
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", dir.display())))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(SourceError::Unavailable(format!(
                "{} contains no images",
                dir.display()
            )));
        }
        log::info!("Found {} frame(s) in {}", files.len(), dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            files: files.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        let Some(path) = self.files.pop_front() else {
            return Ok(None);
        };
        let frame = image::open(&path)?.to_rgb8();
        Ok(Some(frame))
    }

    fn describe(&self) -> String {
        format!("image sequence {}", self.dir.display())
    }
}

/// An in-memory queue of frames, for embedding and tests.
#[derive(Debug, Default)]
pub struct FrameQueue {
    frames: VecDeque<RgbImage>,
}

impl FrameQueue {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frame: RgbImage) {
        self.frames.push_back(frame);
    }
}

impl FrameSource for FrameQueue {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        Ok(self.frames.pop_front())
    }

    fn describe(&self) -> String {
        format!("in-memory queue ({} frames)", self.frames.len())
    }
}
