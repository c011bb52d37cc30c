//! Dense vector primitives.
//!
//! Every function borrows its inputs and returns a fresh `Vec`, so callers
//! never see their input mutated or aliased. Length checks fail loudly: a
//! mismatch means two vectors came from different feature spaces.

use crate::error::{FeatureError, Result};

fn require_non_empty(argument: &'static str, v: &[f32]) -> Result<()> {
    if v.is_empty() {
        return Err(FeatureError::EmptyVector { argument });
    }
    Ok(())
}

fn require_same_length(argument: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(FeatureError::LengthMismatch {
            argument,
            expected,
            found,
        });
    }
    Ok(())
}

/// Sum of elementwise products
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    require_non_empty("a", a)?;
    require_non_empty("b", b)?;
    require_same_length("b", a.len(), b.len())?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Euclidean norm. Zero (or empty) vectors have magnitude 0.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit length.
///
/// A zero vector comes back as a new zero vector of the same length.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let mag = magnitude(v);
    if mag == 0.0 {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| x / mag).collect()
}

/// Cosine of the angle between `a` and `b`.
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_product(a, b)?;
    let denom = magnitude(a) * magnitude(b);
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / denom)
}

/// Elementwise sum
pub fn add(a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
    require_non_empty("a", a)?;
    require_non_empty("b", b)?;
    require_same_length("b", a.len(), b.len())?;
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}

/// Multiply every element by `k`
pub fn scale(v: &[f32], k: f32) -> Vec<f32> {
    v.iter().map(|x| x * k).collect()
}

/// `Σ weights[i] * vectors[i]`
///
/// Both lists must be non-empty and of equal length, and every vector must
/// have the length of the first one.
pub fn weighted_sum<V: AsRef<[f32]>>(vectors: &[V], weights: &[f32]) -> Result<Vec<f32>> {
    if vectors.is_empty() {
        return Err(FeatureError::EmptyVector { argument: "vectors" });
    }
    if weights.is_empty() {
        return Err(FeatureError::EmptyVector { argument: "weights" });
    }
    require_same_length("weights", vectors.len(), weights.len())?;

    let dim = vectors[0].as_ref().len();
    require_non_empty("vectors", vectors[0].as_ref())?;

    let mut acc = vec![0.0f32; dim];
    for (v, &w) in vectors.iter().zip(weights) {
        let v = v.as_ref();
        require_same_length("vectors", dim, v.len())?;
        for (slot, x) in acc.iter_mut().zip(v) {
            *slot += w * x;
        }
    }
    Ok(acc)
}
