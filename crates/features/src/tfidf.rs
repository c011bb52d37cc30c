//! TF-IDF weighting and dense projection.
//!
//! Term frequency is binary presence: categorical values are unique per item,
//! so a present feature scores exactly its inverse document frequency.

use std::collections::HashMap;

use crate::error::{FeatureError, Result};
use crate::vocabulary::CategoryVocabulary;

/// `ln(total_documents / documents_with_feature)`
///
/// A feature present in every document yields 0.
pub fn compute_idf(total_documents: usize, documents_with_feature: usize) -> Result<f32> {
    if total_documents == 0 {
        return Err(FeatureError::invalid("total_documents", total_documents, "must be > 0"));
    }
    if documents_with_feature == 0 || documents_with_feature > total_documents {
        return Err(FeatureError::invalid(
            "documents_with_feature",
            documents_with_feature,
            "must be in 1..=total_documents",
        ));
    }
    Ok((total_documents as f32 / documents_with_feature as f32).ln())
}

/// IDF for every value in one category vocabulary
pub fn idf_table(vocabulary: &CategoryVocabulary, total_documents: usize) -> Result<HashMap<String, f32>> {
    vocabulary
        .frequencies()
        .map(|(term, df)| Ok((term.to_string(), compute_idf(total_documents, df)?)))
        .collect()
}

/// Score the document's features that have an IDF entry.
///
/// Out-of-vocabulary features are skipped.
pub fn compute_tf_idf<S: AsRef<str>>(
    document_features: &[S],
    idf_values: &HashMap<String, f32>,
) -> HashMap<String, f32> {
    document_features
        .iter()
        .filter_map(|feature| {
            let feature = feature.as_ref();
            idf_values
                .get(feature)
                .map(|&idf| (feature.to_string(), idf))
        })
        .collect()
}

/// Scatter sparse scores into a zero-initialised dense vector.
///
/// Scores for values missing from `vocabulary_index` are dropped; an index
/// outside `0..vector_size` is an error.
pub fn build_vector(
    tf_idf_scores: &HashMap<String, f32>,
    vocabulary_index: &HashMap<String, usize>,
    vector_size: usize,
) -> Result<Vec<f32>> {
    let mut vector = vec![0.0f32; vector_size];
    for (feature, &score) in tf_idf_scores {
        let Some(&index) = vocabulary_index.get(feature) else {
            continue;
        };
        if index >= vector_size {
            return Err(FeatureError::IndexOutOfBounds {
                feature: feature.clone(),
                index,
                size: vector_size,
            });
        }
        vector[index] = score;
    }
    Ok(vector)
}

/// Linear scale to [0, 1], clamped at both ends
pub fn normalize_scalar(value: f32, min: f32, max: f32) -> Result<f32> {
    if !(max > min) {
        return Err(FeatureError::invalid("max", max, "must be greater than min"));
    }
    Ok(((value - min) / (max - min)).clamp(0.0, 1.0))
}

/// One-hot vector with a 1 at `value`'s index.
///
/// Absent or unknown values give an all-zero vector.
pub fn one_hot_encode(
    value: Option<&str>,
    vocabulary_index: &HashMap<String, usize>,
    vocabulary_size: usize,
) -> Result<Vec<f32>> {
    if vocabulary_size == 0 {
        return Err(FeatureError::invalid("vocabulary_size", vocabulary_size, "must be > 0"));
    }
    let mut vector = vec![0.0f32; vocabulary_size];
    if let Some(&index) = value.and_then(|v| vocabulary_index.get(v)) {
        if index >= vocabulary_size {
            return Err(FeatureError::IndexOutOfBounds {
                feature: value.unwrap_or_default().to_string(),
                index,
                size: vocabulary_size,
            });
        }
        vector[index] = 1.0;
    }
    Ok(vector)
}
