// THEORY:
// Frame preparation is the bridge between whatever the source delivers and the
// fixed-size grayscale plane the background model learns from. It resizes to the
// configured analysis width, derives luma with the Rec. 601 weights, and cuts out the
// region of interest. The color frame is kept as its own buffer so the overlay never
// leaks into the statistics.

use crate::config::Roi;
use image::{GrayImage, Luma, RgbImage, imageops};

/// Mask value for a background pixel.
pub const BACKGROUND: u8 = 0;
/// Mask value for a foreground pixel.
pub const FOREGROUND: u8 = 255;

/// A frame ready for analysis.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    /// The resized color frame. Annotation works on copies of this.
    pub color: RgbImage,
    /// Luma of the region of interest (or the whole frame), fed to the background model.
    pub luma: GrayImage,
    /// Top-left corner of `luma` inside `color`.
    pub origin: (u32, u32),
}

/// Rec. 601 luma, the same weighting the classic broadcast formula uses.
pub fn luminance(red: u8, green: u8, blue: u8) -> u8 {
    let y = 0.299_f32 * red as f32 + 0.587_f32 * green as f32 + 0.114_f32 * blue as f32;
    y.round().clamp(0.0, 255.0) as u8
}

pub fn to_luma(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        Luma([luminance(r, g, b)])
    })
}

/// Scales `frame` to `width` pixels wide, keeping the aspect ratio.
/// Frames already at that width are returned unchanged.
pub fn resize_to_width(frame: RgbImage, width: u32) -> RgbImage {
    let (w, h) = frame.dimensions();
    if w == width || w == 0 {
        return frame;
    }
    let height = ((h as u64 * width as u64) / w as u64).max(1) as u32;
    imageops::resize(&frame, width, height, imageops::FilterType::Triangle)
}

/// Resizes, converts and crops one raw frame.
pub fn prepare(raw: RgbImage, resize_width: u32, roi: Option<&Roi>) -> PreparedFrame {
    let color = resize_to_width(raw, resize_width);
    let (luma, origin) = match roi {
        Some(roi) => {
            let view = imageops::crop_imm(&color, roi.x, roi.y, roi.width, roi.height);
            (to_luma(&view.to_image()), (roi.x, roi.y))
        }
        None => (to_luma(&color), (0, 0)),
    };
    PreparedFrame {
        color,
        luma,
        origin,
    }
}
