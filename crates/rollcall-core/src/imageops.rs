//! Small RGB raster helpers shared by the detector, embedder and overlay code.
//!
//! Frames are packed RGB, 3 bytes per pixel, row-major.

use crate::types::DetectionBox;

/// Bilinear resize of a packed RGB buffer.
///
/// Sampling uses pixel-center alignment for sub-pixel accuracy; edge pixels
/// clamp rather than wrap.
pub fn resize_rgb(src: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Vec<u8> {
    let sw = src_w as usize;
    let sh = src_h as usize;
    let dw = dst_w as usize;
    let dh = dst_h as usize;

    let mut dst = vec![0u8; dw * dh * 3];
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 || src.len() < sw * sh * 3 {
        return dst;
    }

    let scale_x = sw as f32 / dw as f32;
    let scale_y = sh as f32 / dh as f32;

    for y in 0..dh {
        let src_y = (y as f32 + 0.5) * scale_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, sh as i32 - 1) as usize;
        let y1 = (y0 + 1).min(sh - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..dw {
            let src_x = (x as f32 + 0.5) * scale_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, sw as i32 - 1) as usize;
            let x1 = (x0 + 1).min(sw - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            for c in 0..3 {
                let tl = src[(y0 * sw + x0) * 3 + c] as f32;
                let tr = src[(y0 * sw + x1) * 3 + c] as f32;
                let bl = src[(y1 * sw + x0) * 3 + c] as f32;
                let br = src[(y1 * sw + x1) * 3 + c] as f32;

                let val = tl * (1.0 - fx) * (1.0 - fy)
                    + tr * fx * (1.0 - fy)
                    + bl * (1.0 - fx) * fy
                    + br * fx * fy;

                dst[(y * dw + x) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    dst
}

/// Extract the face crop for a detection box as an owned RGB buffer.
///
/// The box is expected to be clamped to the frame already; callers must skip
/// degenerate boxes before cropping.
pub fn crop_rgb(frame: &[u8], frame_w: u32, b: &DetectionBox) -> Vec<u8> {
    let fw = frame_w as usize;
    let w = b.width() as usize;
    let h = b.height() as usize;

    let mut crop = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        let row = (b.start_y as usize + y) * fw + b.start_x as usize;
        crop.extend_from_slice(&frame[row * 3..(row + w) * 3]);
    }
    crop
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_uniform_stays_uniform() {
        let src = vec![128u8; 100 * 100 * 3];
        let dst = resize_rgb(&src, 100, 100, 200, 200);
        assert_eq!(dst.len(), 200 * 200 * 3);
        assert!(dst.iter().all(|&p| p == 128));
    }

    #[test]
    fn test_resize_identity() {
        let src: Vec<u8> = (0..4 * 4 * 3).map(|i| (i % 251) as u8).collect();
        let dst = resize_rgb(&src, 4, 4, 4, 4);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_resize_empty_source() {
        let dst = resize_rgb(&[], 0, 0, 8, 8);
        assert_eq!(dst.len(), 8 * 8 * 3);
        assert!(dst.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_crop_extracts_region() {
        // 4x4 frame where each pixel's R channel encodes its index.
        let mut frame = vec![0u8; 4 * 4 * 3];
        for i in 0..16 {
            frame[i * 3] = i as u8;
        }
        let b = DetectionBox {
            start_x: 1,
            start_y: 1,
            end_x: 3,
            end_y: 3,
            confidence: 0.9,
        };
        let crop = crop_rgb(&frame, 4, &b);
        assert_eq!(crop.len(), 2 * 2 * 3);
        // Pixels 5, 6, 9, 10 of the source frame.
        assert_eq!(crop[0], 5);
        assert_eq!(crop[3], 6);
        assert_eq!(crop[6], 9);
        assert_eq!(crop[9], 10);
    }
}
