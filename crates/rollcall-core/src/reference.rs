//! Reference embedding database.
//!
//! Holds the precomputed (embedding, identity) pairs produced by the offline
//! enrollment step. Loaded once at startup; the classifier is trained over it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("reference database not found: {0} — run the enrollment step first to collect embeddings")]
    NotFound(String),
    #[error("failed to read reference database: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed reference database: {0} — re-run the enrollment step")]
    Malformed(#[from] serde_json::Error),
    #[error("reference database is empty — run the enrollment step first to collect embeddings")]
    Empty,
    #[error("embedding for {name:?} has {got} values, expected {expected} (all reference embeddings must share one dimensionality)")]
    RaggedDimensions {
        name: String,
        got: usize,
        expected: usize,
    },
}

/// One enrolled identity: name plus its reference embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub name: String,
    pub embedding: Vec<f32>,
}

/// Validated, immutable collection of reference records.
#[derive(Debug)]
pub struct ReferenceDatabase {
    records: Vec<ReferenceRecord>,
    dim: usize,
}

impl ReferenceDatabase {
    /// Load and validate the reference bundle (a JSON array of records).
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        if !path.exists() {
            return Err(ReferenceError::NotFound(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        let records: Vec<ReferenceRecord> = serde_json::from_str(&raw)?;
        let db = Self::from_records(records)?;

        tracing::info!(
            path = %path.display(),
            records = db.len(),
            dim = db.dim(),
            "loaded reference database"
        );
        Ok(db)
    }

    /// Validate records: non-empty, uniform embedding dimensionality.
    pub fn from_records(records: Vec<ReferenceRecord>) -> Result<Self, ReferenceError> {
        let Some(first) = records.first() else {
            return Err(ReferenceError::Empty);
        };
        let dim = first.embedding.len();
        if dim == 0 {
            return Err(ReferenceError::Empty);
        }

        for record in &records {
            if record.embedding.len() != dim {
                return Err(ReferenceError::RaggedDimensions {
                    name: record.name.clone(),
                    got: record.embedding.len(),
                    expected: dim,
                });
            }
        }

        Ok(Self { records, dim })
    }

    /// Embedding dimensionality shared by every record.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, embedding: Vec<f32>) -> ReferenceRecord {
        ReferenceRecord {
            name: name.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_from_records_valid() {
        let db = ReferenceDatabase::from_records(vec![
            record("asha", vec![0.1, 0.2, 0.3]),
            record("ben", vec![0.4, 0.5, 0.6]),
        ])
        .unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.dim(), 3);
    }

    #[test]
    fn test_from_records_empty() {
        let err = ReferenceDatabase::from_records(vec![]).unwrap_err();
        assert!(matches!(err, ReferenceError::Empty));
    }

    #[test]
    fn test_from_records_zero_dim() {
        let err = ReferenceDatabase::from_records(vec![record("asha", vec![])]).unwrap_err();
        assert!(matches!(err, ReferenceError::Empty));
    }

    #[test]
    fn test_from_records_ragged() {
        let err = ReferenceDatabase::from_records(vec![
            record("asha", vec![0.1, 0.2]),
            record("ben", vec![0.4, 0.5, 0.6]),
        ])
        .unwrap_err();
        match err {
            ReferenceError::RaggedDimensions { name, got, expected } => {
                assert_eq!(name, "ben");
                assert_eq!(got, 3);
                assert_eq!(expected, 2);
            }
            other => panic!("expected RaggedDimensions, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReferenceDatabase::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ReferenceError::NotFound(_)));
        // The operator should be pointed at the enrollment step.
        assert!(err.to_string().contains("enrollment"));
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.json");
        let records = vec![
            record("asha", vec![1.0, 0.0]),
            record("ben", vec![0.0, 1.0]),
        ];
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let db = ReferenceDatabase::load(&path).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.records()[0].name, "asha");
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.json");
        std::fs::write(&path, "{ not json ]").unwrap();
        let err = ReferenceDatabase::load(&path).unwrap_err();
        assert!(matches!(err, ReferenceError::Malformed(_)));
    }
}
