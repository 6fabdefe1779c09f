//! Linear maximum-margin identity classifier.
//!
//! One-vs-rest linear SVMs trained at startup over the reference database
//! with hinge-loss SGD (Pegasos schedule). Per-class margins are turned into
//! probabilities with a softmax so callers can apply a single acceptance
//! threshold.

use crate::reference::ReferenceDatabase;
use crate::types::{Embedding, Recognition};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;
use thiserror::Error;

// --- Training constants ---
const TRAIN_EPOCHS: usize = 60;
const TRAIN_LAMBDA: f32 = 1e-4;
const TRAIN_SEED: u64 = 42;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("reference data holds {0} distinct identity(ies); a margin classifier needs at least 2")]
    InsufficientClasses(usize),
    #[error("embedding dimension mismatch: classifier expects {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("non-finite score for identity {0:?}")]
    NonFiniteScore(String),
}

/// Most probable identity for one embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

/// One-vs-rest linear SVM bank over the enrolled identities.
#[derive(Debug)]
pub struct LinearSvm {
    classes: Vec<String>,
    /// Per-class weight vector, parallel to `classes`.
    weights: Vec<Vec<f32>>,
    /// Per-class bias, parallel to `classes`.
    biases: Vec<f32>,
    dim: usize,
}

impl LinearSvm {
    /// Train the classifier over the reference database.
    ///
    /// Deterministic: epoch shuffling uses a fixed seed, so the same
    /// reference data always yields the same classifier.
    pub fn train(db: &ReferenceDatabase) -> Result<Self, ClassifierError> {
        let classes: Vec<String> = db
            .records()
            .iter()
            .map(|r| r.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if classes.len() < 2 {
            return Err(ClassifierError::InsufficientClasses(classes.len()));
        }

        let dim = db.dim();
        let mut rng = StdRng::seed_from_u64(TRAIN_SEED);
        let mut order: Vec<usize> = (0..db.len()).collect();

        let mut weights = Vec::with_capacity(classes.len());
        let mut biases = Vec::with_capacity(classes.len());

        for class in &classes {
            let (w, b) = train_one_vs_rest(db, class, &mut order, &mut rng);
            weights.push(w);
            biases.push(b);
        }

        tracing::info!(
            identities = classes.len(),
            samples = db.len(),
            dim,
            "trained identity classifier"
        );

        Ok(Self {
            classes,
            weights,
            biases,
            dim,
        })
    }

    /// Classify one embedding: the most probable identity and its probability.
    pub fn predict(&self, embedding: &Embedding) -> Result<Prediction, ClassifierError> {
        if embedding.dim() != self.dim {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.dim,
                got: embedding.dim(),
            });
        }

        let mut margins = Vec::with_capacity(self.classes.len());
        for (i, w) in self.weights.iter().enumerate() {
            let margin = dot(w, &embedding.values) + self.biases[i];
            if !margin.is_finite() {
                return Err(ClassifierError::NonFiniteScore(self.classes[i].clone()));
            }
            margins.push(margin);
        }

        let probabilities = softmax(&margins);
        let (best, probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .expect("classifier always has at least two classes");

        Ok(Prediction {
            label: self.classes[best].clone(),
            probability,
        })
    }

    /// Enrolled identity labels, sorted.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Embedding dimensionality the classifier was trained on.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

/// Apply the acceptance threshold: probabilities at or below it are Unknown.
pub fn accept(prediction: Prediction, threshold: f32) -> Recognition {
    if prediction.probability > threshold {
        Recognition::Known {
            name: prediction.label,
            confidence: prediction.probability,
        }
    } else {
        Recognition::Unknown
    }
}

/// Pegasos-style hinge-loss SGD for one binary (class vs rest) problem.
fn train_one_vs_rest(
    db: &ReferenceDatabase,
    class: &str,
    order: &mut [usize],
    rng: &mut StdRng,
) -> (Vec<f32>, f32) {
    let records = db.records();
    let mut w = vec![0.0f32; db.dim()];
    let mut b = 0.0f32;
    let mut t = 0.0f32;

    for _epoch in 0..TRAIN_EPOCHS {
        order.shuffle(rng);
        for &i in order.iter() {
            t += 1.0;
            let eta = 1.0 / (TRAIN_LAMBDA * t);
            let x = &records[i].embedding;
            let y = if records[i].name == class { 1.0 } else { -1.0 };

            let margin = y * (dot(&w, x) + b);
            let shrink = 1.0 - 1.0 / t;
            for wj in w.iter_mut() {
                *wj *= shrink;
            }
            if margin < 1.0 {
                for (wj, xj) in w.iter_mut().zip(x.iter()) {
                    *wj += eta * y * xj;
                }
                b += eta * y;
            }
        }
    }

    (w, b)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Numerically stable softmax.
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
