// OpenCV-backed collaborators: live or recorded video in, MPEG-4 clips out, and a
// highgui preview window whose keys feed the control channel.

use image::{GrayImage, RgbImage};
use opencv::{
    core::{self, Mat, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use sentinel_vision::io::sinks::clip_file_name;
use sentinel_vision::io::{ClipSink, FrameSource, Preview};
use sentinel_vision::{ControlEvent, SinkError, SourceError, SourceSpec};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

fn backend(e: opencv::Error) -> SinkError {
    SinkError::Backend(e.to_string())
}

/// Copies an RGB buffer into a BGR `Mat`.
fn rgb_to_bgr(frame: &RgbImage) -> opencv::Result<Mat> {
    let mut rgb = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.as_raw());
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

fn gray_to_mat(mask: &GrayImage) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        mask.height() as i32,
        mask.width() as i32,
        core::CV_8UC1,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(mask.as_raw());
    Ok(mat)
}

/// A capture device or a video file.
pub struct CaptureSource {
    capture: VideoCapture,
    label: String,
    frame: Mat,
}

impl CaptureSource {
    pub fn open(spec: &SourceSpec) -> Result<Self, SourceError> {
        let unavailable = |e: opencv::Error| SourceError::Unavailable(e.to_string());
        let (capture, label) = match spec {
            SourceSpec::Device(index) => (
                VideoCapture::new(*index as i32, videoio::CAP_ANY).map_err(unavailable)?,
                format!("camera {index}"),
            ),
            SourceSpec::File(path) => {
                let name = path.to_string_lossy();
                (
                    VideoCapture::from_file(&name, videoio::CAP_ANY).map_err(unavailable)?,
                    format!("video {name}"),
                )
            }
            SourceSpec::Images(dir) => {
                return Err(SourceError::Unavailable(format!(
                    "{} is an image directory, not a video source",
                    dir.display()
                )));
            }
        };
        if !capture.is_opened().map_err(unavailable)? {
            return Err(SourceError::Unavailable(format!("cannot open {label}")));
        }
        Ok(Self {
            capture,
            label,
            frame: Mat::default(),
        })
    }
}

impl FrameSource for CaptureSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        let read = |e: opencv::Error| SourceError::Read(e.to_string());
        if !self.capture.read(&mut self.frame).map_err(read)? || self.frame.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(&self.frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(read)?;
        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb.data_bytes().map_err(read)?.to_vec();
        RgbImage::from_raw(width, height, bytes)
            .map(Some)
            .ok_or_else(|| SourceError::Read(format!("unexpected buffer for {width}x{height} frame")))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Writes each motion event as an `mp4v` clip.
pub struct VideoClipSink {
    dir: PathBuf,
    writer: Option<(VideoWriter, PathBuf)>,
}

impl VideoClipSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writer: None,
        }
    }
}

impl ClipSink for VideoClipSink {
    fn open(
        &mut self,
        started_at: DateTime<Local>,
        fps: f64,
        width: u32,
        height: u32,
    ) -> Result<PathBuf, SinkError> {
        if self.writer.is_some() {
            self.close()?;
        }
        let path = self.dir.join(clip_file_name(started_at, "mp4"));
        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v').map_err(backend)?;
        let writer = VideoWriter::new(
            &path.to_string_lossy(),
            fourcc,
            fps,
            core::Size::new(width as i32, height as i32),
            true,
        )
        .map_err(backend)?;
        if !writer.is_opened().map_err(backend)? {
            return Err(SinkError::Backend(format!("cannot write {}", path.display())));
        }
        self.writer = Some((writer, path.clone()));
        Ok(path)
    }

    fn append(&mut self, frame: &RgbImage) -> Result<(), SinkError> {
        let (writer, _) = self.writer.as_mut().ok_or(SinkError::ClipNotOpen)?;
        let bgr = rgb_to_bgr(frame).map_err(backend)?;
        writer.write(&bgr).map_err(backend)
    }

    fn close(&mut self) -> Result<Option<PathBuf>, SinkError> {
        let Some((mut writer, path)) = self.writer.take() else {
            return Ok(None);
        };
        writer.release().map_err(backend)?;
        Ok(Some(path))
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}

const FRAME_WINDOW: &str = "Motion Detection";
const MASK_WINDOW: &str = "Foreground Mask";

/// Two highgui windows. `q` quits and `s` saves a manual snapshot.
pub struct WindowPreview {
    controls: UnboundedSender<ControlEvent>,
}

impl WindowPreview {
    pub fn new(controls: UnboundedSender<ControlEvent>) -> Self {
        Self { controls }
    }
}

impl Preview for WindowPreview {
    fn show(&mut self, annotated: &RgbImage, mask: &GrayImage) -> Result<(), SinkError> {
        highgui::imshow(FRAME_WINDOW, &rgb_to_bgr(annotated).map_err(backend)?).map_err(backend)?;
        highgui::imshow(MASK_WINDOW, &gray_to_mat(mask).map_err(backend)?).map_err(backend)?;

        let key = highgui::wait_key(1).map_err(backend)?;
        let event = match u8::try_from(key & 0xff).map(char::from) {
            Ok('q') => Some(ControlEvent::Quit),
            Ok('s') => Some(ControlEvent::ManualSnapshot),
            _ => None,
        };
        if let Some(event) = event {
            let _ = self.controls.send(event);
        }
        Ok(())
    }
}

impl Drop for WindowPreview {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}
