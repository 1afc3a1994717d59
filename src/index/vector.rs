//! VectorStore: per-property fixed-width dense vectors with cached magnitudes
//!
//! Keyed by [`DocumentId`] rather than [`InternalId`] — the one sub-index
//! that departs from the "postings are InternalId-keyed" rule, because a
//! vector slot is a direct value store (not a posting list) and the data
//! model explicitly keys it by the external id (§3: `vectors: map<DocumentId,
//! (magnitude, data[size])>`).

use crate::error::{FacetError, Result};
use crate::id::DocumentId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVector {
    pub magnitude: f32,
    pub data: Box<[f32]>,
}

/// Stores one fixed-width dense vector per document for a single property.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorStore {
    size: usize,
    vectors: AHashMap<DocumentId, StoredVector>,
}

impl VectorStore {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            vectors: AHashMap::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Normalizes any numeric iterator into a dense `f32` vector and caches
    /// its magnitude. Errors if the input length does not equal this
    /// store's configured `size`.
    pub fn insert<I, T>(&mut self, property: &str, doc_id: DocumentId, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        let data: Vec<f32> = values.into_iter().map(|v| v.into() as f32).collect();
        if data.len() != self.size {
            return Err(FacetError::InvalidVectorSize {
                property: property.to_string(),
                expected: self.size,
                actual: data.len(),
            });
        }

        let magnitude = data.iter().map(|v| v * v).sum::<f32>().sqrt();
        self.vectors.insert(
            doc_id,
            StoredVector {
                magnitude,
                data: data.into_boxed_slice(),
            },
        );
        Ok(())
    }

    pub fn get(&self, doc_id: &DocumentId) -> Option<&StoredVector> {
        self.vectors.get(doc_id)
    }

    pub fn remove(&mut self, doc_id: &DocumentId) {
        self.vectors.remove(doc_id);
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl StoredVector {
    /// Convenience for this crate's own tests; the real ranker is an
    /// external collaborator (§1).
    pub fn cosine_similarity_to(&self, other: &StoredVector) -> f32 {
        if self.magnitude == 0.0 || other.magnitude == 0.0 {
            return 0.0;
        }
        let dot: f32 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum();
        dot / (self.magnitude * other.magnitude)
    }
}
