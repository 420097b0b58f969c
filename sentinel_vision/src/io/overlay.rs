// THEORY:
// The overlay is what a human sees: every surviving blob gets a green bounding box,
// a yellow convex hull and its per-frame label, and the frame gets a timestamp in the
// bottom-left corner. It always draws on a copy. The frame the pipeline analysed is
// never touched, so the drawing can never leak back into the background statistics.
//
// Text uses a tiny built-in 3x5 bitmap font covering exactly the characters the
// overlay needs (digits, '-', ':', '#' and space), so no font file is required.

use crate::core_modules::blob::Blob;
use crate::io::sinks::log_timestamp;
use chrono::{DateTime, Local};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const HULL_COLOR: Rgb<u8> = Rgb([255, 220, 0]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
const TEXT_SCALE: u32 = 2;

/// Rows of a 3x5 glyph, most significant of the low three bits on the left.
fn glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        _ => [0; 5],
    }
}

/// Width in pixels of `text` rendered at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * (GLYPH_WIDTH + 1) - 1) * scale
}

/// Draws `text` with its top-left corner at (`x`, `y`). Pixels falling outside the
/// canvas are skipped.
pub fn draw_text_mut(canvas: &mut RgbImage, x: i32, y: i32, text: &str, scale: u32, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    let scale = scale.max(1) as i32;
    let advance = (GLYPH_WIDTH as i32 + 1) * scale;

    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as i32 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH as i32 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = origin_x + col * scale + dx;
                        let py = y + row as i32 * scale + dy;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// Returns an annotated copy of `frame`.
pub fn annotate(frame: &RgbImage, blobs: &[Blob], at: DateTime<Local>) -> RgbImage {
    let mut canvas = frame.clone();
    let glyph_h = (GLYPH_HEIGHT * TEXT_SCALE) as i32;

    for blob in blobs {
        let bbox = blob.bounding_box;

        // --- 1. Bounding Box (2px) ---
        let outer = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
        draw_hollow_rect_mut(&mut canvas, outer, BOX_COLOR);
        if bbox.width > 2 && bbox.height > 2 {
            let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1)
                .of_size(bbox.width - 2, bbox.height - 2);
            draw_hollow_rect_mut(&mut canvas, inner, BOX_COLOR);
        }

        // --- 2. Convex Hull ---
        let hull = &blob.convex_hull;
        if hull.len() >= 2 {
            for (i, start) in hull.iter().enumerate() {
                let end = hull[(i + 1) % hull.len()];
                draw_line_segment_mut(
                    &mut canvas,
                    (start.x as f32, start.y as f32),
                    (end.x as f32, end.y as f32),
                    HULL_COLOR,
                );
            }
        }

        // --- 3. Label ---
        let label = format!("#{}", blob.label);
        let label_y = if bbox.y as i32 > glyph_h + 2 {
            bbox.y as i32 - glyph_h - 2
        } else {
            bbox.y as i32 + 3
        };
        let max_x = canvas.width().saturating_sub(text_width(&label, TEXT_SCALE));
        let label_x = bbox.x.min(max_x) as i32;
        draw_text_mut(&mut canvas, label_x, label_y, &label, TEXT_SCALE, BOX_COLOR);
    }

    // --- 4. Timestamp ---
    let y = canvas.height() as i32 - glyph_h - 4;
    draw_text_mut(&mut canvas, 4, y, &log_timestamp(at), TEXT_SCALE, TEXT_COLOR);

    canvas
}
