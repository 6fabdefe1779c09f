//! Frame type and YUYV to RGB conversion.

/// A captured RGB camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub sequence: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Convert packed YUYV (4:2:2) to RGB using BT.601 integer math.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V], both pixels sharing
/// the U/V pair.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let pixels = (width * height) as usize;
    let expected = pixels * 2;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity(pixels * 3);
    for quad in yuyv[..expected].chunks_exact(4) {
        let u = quad[1] as i32 - 128;
        let v = quad[3] as i32 - 128;
        for &y in &[quad[0], quad[2]] {
            let c = y as i32 - 16;
            let r = (298 * c + 409 * v + 128) >> 8;
            let g = (298 * c - 100 * u - 208 * v + 128) >> 8;
            let b = (298 * c + 516 * u + 128) >> 8;
            rgb.push(r.clamp(0, 255) as u8);
            rgb.push(g.clamp(0, 255) as u8);
            rgb.push(b.clamp(0, 255) as u8);
        }
    }

    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_black() {
        // Video black: Y=16, neutral chroma.
        let yuyv = vec![16, 128, 16, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb, vec![0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_yuyv_white() {
        // Video white: Y=235, neutral chroma → (298*219+128)>>8 = 255.
        let yuyv = vec![235, 128, 235, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb, vec![255, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_yuyv_mid_gray() {
        // Y=128, neutral chroma → (298*112+128)>>8 = 130 on every channel.
        let yuyv = vec![128, 128, 128, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb, vec![130, 130, 130, 130, 130, 130]);
    }

    #[test]
    fn test_yuyv_red_lean() {
        // Strong V pushes red up: Y=81, U=90, V=240 is approximately pure red.
        let yuyv = vec![81, 90, 81, 240];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
        assert!(r > 240, "r = {r}");
        assert!(g < 30, "g = {g}");
        assert!(b < 30, "b = {b}");
    }

    #[test]
    fn test_yuyv_shared_chroma_pair() {
        // The two pixels in one quad share U/V but keep their own luma.
        let yuyv = vec![100, 128, 200, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert!(rgb[0] < rgb[3]);
        assert_eq!(rgb[0], rgb[1]);
        assert_eq!(rgb[3], rgb[4]);
    }

    #[test]
    fn test_yuyv_invalid_length() {
        let result = yuyv_to_rgb(&[100, 128], 2, 1);
        assert!(result.is_err());
    }
}
