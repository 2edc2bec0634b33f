//! Pixel-level drawing helpers: bounding-box outlines on live frames and the
//! timestamp stamp burned into the representative snapshot.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::motion::error::{MotionError, Result};

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const STAMP_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const BOX_THICKNESS: u32 = 3;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SCALE: u32 = 2;
const STAMP_MARGIN: u32 = 8;

/// Draws an axis-aligned rectangle outline, 3 px wide, clamped to the image.
pub fn draw_rect_outline(frame: &mut RgbImage, x: u32, y: u32, width: u32, height: u32) {
    let (fw, fh) = frame.dimensions();
    let x1 = (x + width).min(fw);
    let y1 = (y + height).min(fh);

    for py in y..y1 {
        for px in x..x1 {
            let on_vertical = px < x + BOX_THICKNESS || px + BOX_THICKNESS >= x1;
            let on_horizontal = py < y + BOX_THICKNESS || py + BOX_THICKNESS >= y1;
            if on_vertical || on_horizontal {
                frame.put_pixel(px, py, BOX_COLOR);
            }
        }
    }
}

/// Reads the image at `path`, draws `text` bottom-left in red and writes the
/// file back. Failure leaves the file as-is and surfaces a typed error for
/// the caller to log; it never aborts the frame loop.
pub fn stamp_timestamp(path: &Path, text: &str) -> Result<()> {
    let mut img = image::open(path)
        .map_err(|source| MotionError::SnapshotRead {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();

    let line_height = GLYPH_HEIGHT * GLYPH_SCALE;
    let y = img.height().saturating_sub(line_height + STAMP_MARGIN);
    draw_text(&mut img, text, STAMP_MARGIN, y);

    img.save(path)?;
    Ok(())
}

/// Rasterizes `text` with the built-in 5x7 monospace glyphs.
pub fn draw_text(frame: &mut RgbImage, text: &str, x: u32, y: u32) {
    let advance = (GLYPH_WIDTH + 1) * GLYPH_SCALE;
    for (i, ch) in text.chars().enumerate() {
        draw_glyph(frame, ch, x + i as u32 * advance, y);
    }
}

fn draw_glyph(frame: &mut RgbImage, ch: char, x: u32, y: u32) {
    let rows = glyph(ch);
    let (fw, fh) = frame.dimensions();

    for (row, &bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                continue;
            }
            for sy in 0..GLYPH_SCALE {
                for sx in 0..GLYPH_SCALE {
                    let px = x + col * GLYPH_SCALE + sx;
                    let py = y + row as u32 * GLYPH_SCALE + sy;
                    if px < fw && py < fh {
                        frame.put_pixel(px, py, STAMP_COLOR);
                    }
                }
            }
        }
    }
}

/// 5x7 bitmap rows, one byte per row, low 5 bits used. Covers the characters
/// produced by the timestamp format; anything else renders blank.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        _ => [0x00; 7],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_outline_leaves_interior() {
        let mut frame = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));
        draw_rect_outline(&mut frame, 5, 5, 20, 20);

        assert_eq!(*frame.get_pixel(5, 5), BOX_COLOR);
        assert_eq!(*frame.get_pixel(24, 24), BOX_COLOR);
        // interior untouched
        assert_eq!(*frame.get_pixel(15, 15), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_rect_outline_clamps_to_frame() {
        let mut frame = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        draw_rect_outline(&mut frame, 15, 15, 50, 50);
        assert_eq!(*frame.get_pixel(19, 19), BOX_COLOR);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut frame = RgbImage::from_pixel(200, 40, Rgb([0, 0, 0]));
        draw_text(&mut frame, "2024-01-02 10:20:30", 4, 4);

        let red = frame.pixels().filter(|p| **p == STAMP_COLOR).count();
        assert!(red > 0);
    }

    #[test]
    fn test_stamp_missing_file_is_error() {
        let err = stamp_timestamp(Path::new("/nonexistent/1.png"), "10:00:00");
        assert!(err.is_err());
    }

    #[test]
    fn test_stamp_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.png");
        RgbImage::from_pixel(120, 60, Rgb([0, 0, 0]))
            .save(&path)
            .unwrap();

        stamp_timestamp(&path, "2024-01-02 10:20:30").unwrap();

        let stamped = image::open(&path).unwrap().to_rgb8();
        assert!(stamped.pixels().any(|p| *p == STAMP_COLOR));
    }
}
