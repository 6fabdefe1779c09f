//! rollcall-core — the face recognition pipeline.
//!
//! Detects faces with a res10 SSD, embeds them with a FaceNet-style model
//! (both via ONNX Runtime for CPU inference), and maps embeddings to
//! enrolled identities with a linear maximum-margin classifier trained at
//! startup from the reference database.

pub mod classifier;
pub mod detector;
pub mod embedder;
pub mod imageops;
pub mod reference;
pub mod types;

pub use classifier::{LinearSvm, Prediction};
pub use detector::FaceDetector;
pub use embedder::{FaceEmbedder, EMBEDDING_DIM};
pub use reference::{ReferenceDatabase, ReferenceRecord};
pub use types::{DetectionBox, Embedding, Recognition};
