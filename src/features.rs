//! Fixed-length feature vectors for (state, action) pairs
//!
//! Feature contents are opaque to the learning core; only their fixed
//! numeric length matters. Vectors hash and compare by value so they can
//! key the advised-state map.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An ordered, fixed-length sequence of real numbers describing one
/// (state, action) pair.
///
/// Immutable once created. Equality and hashing go through the bit
/// patterns of the entries, so two vectors produced from the same state
/// and action always collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl PartialEq for FeatureVector {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for FeatureVector {}

impl Hash for FeatureVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in &self.values {
            v.to_bits().hash(state);
        }
    }
}
