//! Composite canvas and frame annotation.
//!
//! The annotated camera frame is scaled and pasted onto a fixed background
//! canvas; boxes and labels are drawn directly into packed RGB buffers with
//! a small embedded 5x7 font.

use rollcall_core::types::DetectionBox;
use std::path::Path;

pub const GREEN: [u8; 3] = [0, 255, 0];
pub const RED: [u8; 3] = [255, 0, 0];

const BACKGROUND_FILL: [u8; 3] = [24, 24, 32];

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
/// Pixel scale applied when rendering label text.
const LABEL_SCALE: u32 = 2;
/// Label baseline offset above the box's top edge.
const LABEL_MARGIN: u32 = 10;

/// Packed RGB canvas.
pub struct Canvas {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Solid-color canvas.
    pub fn solid(width: u32, height: u32) -> Self {
        let mut data = Vec::with_capacity((width * height) as usize * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&BACKGROUND_FILL);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Load the background image, scaled to the canvas size.
    ///
    /// A missing or unreadable file falls back to a solid canvas with a
    /// warning; the session still runs.
    pub fn load_background(path: &Path, width: u32, height: u32) -> Self {
        match image::open(path) {
            Ok(img) => {
                let rgb = img.to_rgb8();
                let data = rollcall_core::imageops::resize_rgb(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    width,
                    height,
                );
                Self {
                    data,
                    width,
                    height,
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "background image unavailable, using solid canvas"
                );
                Self::solid(width, height)
            }
        }
    }

    /// Paste an RGB buffer at the given offset, clipping at canvas edges.
    pub fn paste(&mut self, src: &[u8], src_w: u32, src_h: u32, off_x: u32, off_y: u32) {
        let cw = self.width as usize;
        let ch = self.height as usize;
        let sw = src_w as usize;

        for y in 0..src_h as usize {
            let cy = off_y as usize + y;
            if cy >= ch {
                break;
            }
            let copy_w = sw.min(cw.saturating_sub(off_x as usize));
            if copy_w == 0 {
                break;
            }
            let src_base = y * sw * 3;
            let dst_base = (cy * cw + off_x as usize) * 3;
            self.data[dst_base..dst_base + copy_w * 3]
                .copy_from_slice(&src[src_base..src_base + copy_w * 3]);
        }
    }
}

/// Draw a rectangle outline into a packed RGB buffer.
///
/// The box is already frame-clamped; edge-touching rectangles stay in bounds.
pub fn draw_rect(frame: &mut [u8], width: u32, height: u32, b: &DetectionBox, color: [u8; 3]) {
    let thickness = 2u32;
    for t in 0..thickness {
        let x1 = b.start_x.saturating_add(t).min(width.saturating_sub(1));
        let y1 = b.start_y.saturating_add(t).min(height.saturating_sub(1));
        let x2 = b.end_x.saturating_sub(t + 1).min(width.saturating_sub(1));
        let y2 = b.end_y.saturating_sub(t + 1).min(height.saturating_sub(1));

        for x in x1..=x2 {
            put_pixel(frame, width, height, x, y1, color);
            put_pixel(frame, width, height, x, y2, color);
        }
        for y in y1..=y2 {
            put_pixel(frame, width, height, x1, y, color);
            put_pixel(frame, width, height, x2, y, color);
        }
    }
}

/// Draw uppercase label text just above a box's top-left corner.
pub fn draw_label(frame: &mut [u8], width: u32, height: u32, b: &DetectionBox, text: &str, color: [u8; 3]) {
    let glyph_h = GLYPH_HEIGHT as u32 * LABEL_SCALE;
    let y = b.start_y.saturating_sub(glyph_h + LABEL_MARGIN);
    draw_text(frame, width, height, b.start_x, y, text, color);
}

/// Render text at (x, y) with the embedded 5x7 font.
pub fn draw_text(frame: &mut [u8], width: u32, height: u32, x: u32, y: u32, text: &str, color: [u8; 3]) {
    let advance = (GLYPH_WIDTH as u32 + 1) * LABEL_SCALE;
    for (i, c) in text.chars().enumerate() {
        let gx = x + i as u32 * advance;
        if gx >= width {
            break;
        }
        draw_glyph(frame, width, height, gx, y, c, color);
    }
}

fn draw_glyph(frame: &mut [u8], width: u32, height: u32, x: u32, y: u32, c: char, color: [u8; 3]) {
    let rows = glyph(c.to_ascii_uppercase());
    for (gy, row) in rows.iter().enumerate() {
        for gx in 0..GLYPH_WIDTH {
            if row & (1 << (GLYPH_WIDTH - 1 - gx)) == 0 {
                continue;
            }
            for sy in 0..LABEL_SCALE {
                for sx in 0..LABEL_SCALE {
                    put_pixel(
                        frame,
                        width,
                        height,
                        x + gx as u32 * LABEL_SCALE + sx,
                        y + gy as u32 * LABEL_SCALE + sy,
                        color,
                    );
                }
            }
        }
    }
}

fn put_pixel(frame: &mut [u8], width: u32, height: u32, x: u32, y: u32, color: [u8; 3]) {
    if x >= width || y >= height {
        return;
    }
    let base = ((y * width + x) * 3) as usize;
    frame[base..base + 3].copy_from_slice(&color);
}

/// 5x7 glyph rows, MSB-leftmost. Unrecognized characters render a box.
fn glyph(c: char) -> [u8; 7] {
    match c {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ' ' => [0; 7],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}
