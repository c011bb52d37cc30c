//! The FilterPipeline chains candidate filters.

use tracing::debug;

use crate::traits::{Candidate, CandidateContext, Filter};

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(MediaKindFilter::new(MediaKind::Movie))
///     .add_filter(AlreadyWatchedFilter)
///     .add_filter(MissingEmbeddingFilter);
///
/// let eligible = pipeline.apply(candidates, &context);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters, in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence to the candidates.
    pub fn apply(&self, candidates: Vec<Candidate>, context: &CandidateContext<'_>) -> Vec<Candidate> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, context);
            debug!(
                "Filter {} kept {} of {} candidates",
                filter.name(),
                current.len(),
                before
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{AlreadyWatchedFilter, MediaKindFilter};
    use crate::profile::UserProfile;
    use catalog::MediaKind;
    use features::EmbeddingMap;
    use std::collections::HashSet;

    fn profile(watched: &[&str]) -> UserProfile {
        UserProfile {
            user_id: "u1".to_string(),
            vector: vec![1.0],
            watched_item_count: watched.len(),
            watched_items: watched.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
        }
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let profile = profile(&[]);
        let embeddings = EmbeddingMap::new();
        let context = CandidateContext {
            profile: &profile,
            embeddings: &embeddings,
        };

        let candidates = vec![
            Candidate::new("1", MediaKind::Movie),
            Candidate::new("2", MediaKind::Series),
        ];

        let filtered = pipeline.apply(candidates, &context);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filters_compose_in_order() {
        let pipeline = FilterPipeline::new()
            .add_filter(MediaKindFilter::new(MediaKind::Movie))
            .add_filter(AlreadyWatchedFilter);
        assert_eq!(pipeline.filter_names(), vec!["MediaKindFilter", "AlreadyWatchedFilter"]);

        let profile = profile(&["1"]);
        let embeddings = EmbeddingMap::new();
        let context = CandidateContext {
            profile: &profile,
            embeddings: &embeddings,
        };

        let candidates = vec![
            Candidate::new("1", MediaKind::Movie),
            Candidate::new("2", MediaKind::Series),
            Candidate::new("3", MediaKind::Movie),
        ];

        let filtered = pipeline.apply(candidates, &context);
        assert_eq!(filtered, vec![Candidate::new("3", MediaKind::Movie)]);
    }
}
