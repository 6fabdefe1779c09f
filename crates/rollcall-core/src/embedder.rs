//! FaceNet-style face embedder via ONNX Runtime.
//!
//! Maps a cropped RGB face image to a 512-dimensional embedding. Crops are
//! resized to 160x160 and prewhitened (per-image standardization) before
//! inference, matching the FaceNet input distribution.

use crate::imageops;
use crate::types::Embedding;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const EMBEDDER_INPUT_SIZE: usize = 160;
pub const EMBEDDING_DIM: usize = 512;

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("embedder model not found: {0} — place the face embedding ONNX export there")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("model produced a {got}-dim embedding, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// FaceNet-style face embedder.
pub struct FaceEmbedder {
    session: Session,
}

impl FaceEmbedder {
    /// Load the embedder ONNX model from the given path.
    pub fn load(model_path: &Path) -> Result<Self, EmbedderError> {
        if !model_path.exists() {
            return Err(EmbedderError::ModelNotFound(
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
            "loaded face embedder"
        );

        Ok(Self { session })
    }

    /// Compute the embedding for a cropped RGB face image.
    ///
    /// Deterministic for a fixed input. Precondition: the crop has non-zero
    /// area (callers skip degenerate boxes before invoking this).
    pub fn embed(
        &mut self,
        crop: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Embedding, EmbedderError> {
        let input = preprocess(crop, width, height);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbedderError::InferenceFailed(format!("embedding extraction: {e}")))?;

        if raw.len() != EMBEDDING_DIM {
            return Err(EmbedderError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                got: raw.len(),
            });
        }

        Ok(Embedding::new(raw.to_vec()))
    }
}

/// Resize a crop to 160x160 and prewhiten it into an NHWC float tensor.
///
/// Prewhitening standardizes the whole image to zero mean and unit variance;
/// the divisor is floored so a flat crop cannot divide by (near) zero.
fn preprocess(crop: &[u8], width: u32, height: u32) -> Array4<f32> {
    let size = EMBEDDER_INPUT_SIZE;
    let resized = imageops::resize_rgb(crop, width, height, size as u32, size as u32);

    let n = resized.len() as f32;
    let mean = resized.iter().map(|&p| p as f32).sum::<f32>() / n;
    let var = resized
        .iter()
        .map(|&p| (p as f32 - mean).powi(2))
        .sum::<f32>()
        / n;
    let std = var.sqrt().max(1.0 / n.sqrt());

    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    for y in 0..size {
        for x in 0..size {
            let base = (y * size + x) * 3;
            for c in 0..3 {
                tensor[[0, y, x, c]] = (resized[base + c] as f32 - mean) / std;
            }
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_output_shape() {
        let crop = vec![128u8; 64 * 64 * 3];
        let tensor = preprocess(&crop, 64, 64);
        assert_eq!(
            tensor.shape(),
            &[1, EMBEDDER_INPUT_SIZE, EMBEDDER_INPUT_SIZE, 3]
        );
    }

    #[test]
    fn test_preprocess_zero_mean() {
        let crop: Vec<u8> = (0..96 * 96 * 3).map(|i| (i % 256) as u8).collect();
        let tensor = preprocess(&crop, 96, 96);
        let mean: f32 = tensor.iter().sum::<f32>() / tensor.len() as f32;
        assert!(mean.abs() < 1e-3, "prewhitened mean {mean}");
    }

    #[test]
    fn test_preprocess_flat_crop_stays_finite() {
        // A flat crop has zero variance; the floored divisor must keep the
        // output finite (and zero, since every value equals the mean).
        let crop = vec![77u8; 32 * 32 * 3];
        let tensor = preprocess(&crop, 32, 32);
        assert!(tensor.iter().all(|v| v.is_finite()));
        assert!(tensor.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_preprocess_deterministic() {
        let crop: Vec<u8> = (0..48 * 48 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let a = preprocess(&crop, 48, 48);
        let b = preprocess(&crop, 48, 48);
        assert_eq!(a, b);
    }
}
