//! SSD face detector via ONNX Runtime.
//!
//! Runs a res10-style 300x300 single-shot detector and decodes its
//! `[1, 1, N, 7]` output rows into frame-space boxes.

use crate::imageops;
use crate::types::DetectionBox;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

// --- Named constants (no magic numbers) ---
const SSD_INPUT_SIZE: usize = 300;
/// Mean subtraction values in BGR channel order, matching the Caffe export.
const SSD_MEAN_BGR: [f32; 3] = [104.0, 177.0, 123.0];
/// Values per detection row: [image_id, class_id, confidence, x1, y1, x2, y2].
const SSD_ROW_LEN: usize = 7;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("detector model not found: {0} — place the face detection ONNX export there")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// SSD-based face detector.
pub struct FaceDetector {
    session: Session,
    confidence_threshold: f32,
}

impl FaceDetector {
    /// Load the detector ONNX model from the given path.
    pub fn load(model_path: &Path, confidence_threshold: f32) -> Result<Self, DetectorError> {
        if !model_path.exists() {
            return Err(DetectorError::ModelNotFound(
                model_path.display().to_string(),
            ));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = %model_path.display(),
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            confidence_threshold,
            "loaded SSD face detector"
        );

        Ok(Self {
            session,
            confidence_threshold,
        })
    }

    /// Detect faces in a packed RGB frame.
    ///
    /// No detections is a valid outcome and returns an empty vec.
    pub fn detect(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<DetectionBox>, DetectorError> {
        let input = preprocess(frame, width, height);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, rows) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::InferenceFailed(format!("detection output: {e}")))?;

        Ok(decode_detections(
            rows,
            width,
            height,
            self.confidence_threshold,
        ))
    }
}

/// Preprocess an RGB frame into the SSD input tensor.
///
/// Resizes to 300x300 with bilinear interpolation, reorders channels to BGR
/// and subtracts the per-channel training means (NCHW layout).
fn preprocess(frame: &[u8], width: u32, height: u32) -> Array4<f32> {
    let size = SSD_INPUT_SIZE;
    let resized = imageops::resize_rgb(frame, width, height, size as u32, size as u32);

    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for y in 0..size {
        for x in 0..size {
            let base = (y * size + x) * 3;
            let r = resized[base] as f32;
            let g = resized[base + 1] as f32;
            let b = resized[base + 2] as f32;
            tensor[[0, 0, y, x]] = b - SSD_MEAN_BGR[0];
            tensor[[0, 1, y, x]] = g - SSD_MEAN_BGR[1];
            tensor[[0, 2, y, x]] = r - SSD_MEAN_BGR[2];
        }
    }

    tensor
}

/// Decode flat `[1, 1, N, 7]` output rows into frame-space boxes.
///
/// Coordinates are normalized to [0, 1]; they are scaled by the frame size,
/// clamped to its bounds, and boxes that end up with no interior pixels or
/// with confidence at or below the threshold are dropped.
fn decode_detections(rows: &[f32], width: u32, height: u32, threshold: f32) -> Vec<DetectionBox> {
    let w = width as f32;
    let h = height as f32;

    let mut boxes = Vec::new();
    for row in rows.chunks_exact(SSD_ROW_LEN) {
        let confidence = row[2];
        if confidence <= threshold {
            continue;
        }

        let start_x = (row[3] * w).clamp(0.0, w) as u32;
        let start_y = (row[4] * h).clamp(0.0, h) as u32;
        let end_x = (row[5] * w).clamp(0.0, w) as u32;
        let end_y = (row[6] * h).clamp(0.0, h) as u32;

        let b = DetectionBox {
            start_x,
            start_y,
            end_x,
            end_y,
            confidence,
        };
        if b.is_degenerate() {
            tracing::debug!(?b, "dropping degenerate detection");
            continue;
        }
        boxes.push(b);
    }

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(conf: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> [f32; 7] {
        [0.0, 1.0, conf, x1, y1, x2, y2]
    }

    #[test]
    fn test_decode_scales_to_frame() {
        let rows = row(0.9, 0.25, 0.25, 0.75, 0.5);
        let boxes = decode_detections(&rows, 640, 480, 0.5);
        assert_eq!(boxes.len(), 1);
        let b = &boxes[0];
        assert_eq!((b.start_x, b.start_y, b.end_x, b.end_y), (160, 120, 480, 240));
        assert!((b.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_decode_drops_low_confidence() {
        let mut rows = Vec::new();
        rows.extend_from_slice(&row(0.4, 0.1, 0.1, 0.5, 0.5));
        rows.extend_from_slice(&row(0.5, 0.1, 0.1, 0.5, 0.5)); // exactly at threshold
        rows.extend_from_slice(&row(0.6, 0.1, 0.1, 0.5, 0.5));
        let boxes = decode_detections(&rows, 640, 480, 0.5);
        assert_eq!(boxes.len(), 1);
        assert!((boxes[0].confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_decode_clamps_out_of_frame() {
        // Box extends past the right/bottom edges.
        let rows = row(0.9, 0.5, 0.5, 1.4, 1.2);
        let boxes = decode_detections(&rows, 100, 100, 0.5);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].end_x, 100);
        assert_eq!(boxes[0].end_y, 100);
    }

    #[test]
    fn test_decode_drops_fully_outside() {
        // Entirely beyond the frame: clamps to a zero-area box at the edge.
        let rows = row(0.9, 1.1, 1.1, 1.5, 1.5);
        let boxes = decode_detections(&rows, 100, 100, 0.5);
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_decode_empty_output() {
        assert!(decode_detections(&[], 640, 480, 0.5).is_empty());
    }

    #[test]
    fn test_preprocess_shape_and_means() {
        // Uniform mid-gray frame: every channel is 128 before mean subtraction.
        let frame = vec![128u8; 64 * 64 * 3];
        let tensor = preprocess(&frame, 64, 64);
        assert_eq!(tensor.shape(), &[1, 3, SSD_INPUT_SIZE, SSD_INPUT_SIZE]);
        assert!((tensor[[0, 0, 0, 0]] - (128.0 - SSD_MEAN_BGR[0])).abs() < 1e-4);
        assert!((tensor[[0, 1, 0, 0]] - (128.0 - SSD_MEAN_BGR[1])).abs() < 1e-4);
        assert!((tensor[[0, 2, 0, 0]] - (128.0 - SSD_MEAN_BGR[2])).abs() < 1e-4);
    }

    #[test]
    fn test_preprocess_channel_order_is_bgr() {
        // A pure-red frame must land in the last (R) channel slot.
        let mut frame = vec![0u8; 16 * 16 * 3];
        for px in frame.chunks_exact_mut(3) {
            px[0] = 200;
        }
        let tensor = preprocess(&frame, 16, 16);
        assert!((tensor[[0, 2, 150, 150]] - (200.0 - SSD_MEAN_BGR[2])).abs() < 1e-4);
        assert!((tensor[[0, 0, 150, 150]] - (0.0 - SSD_MEAN_BGR[0])).abs() < 1e-4);
    }
}
