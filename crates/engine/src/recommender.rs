//! Candidate scoring and ranking.
//!
//! ## Algorithm
//! 1. Take every catalog item as a candidate
//! 2. Keep items of the requested kind that the user hasn't watched and
//!    that have an embedding
//! 3. Score each by cosine similarity against the profile vector
//! 4. Sort by score (highest first), ties by item id, and keep the top N

use catalog::{ItemId, LibraryIndex, MediaKind};
use features::{EmbeddingMap, FeatureError};
use features::vector_math::{cosine_similarity, magnitude};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::filter_pipeline::FilterPipeline;
use crate::filters::{AlreadyWatchedFilter, MediaKindFilter, MissingEmbeddingFilter};
use crate::profile::UserProfile;
use crate::traits::{Candidate, CandidateContext};

/// An item id with its similarity to the user's profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub score: f32,
}

/// Sort descending by score with item id as the tie-break, then truncate
pub fn rank(mut scored: Vec<ScoredItem>, limit: usize) -> Vec<ScoredItem> {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    scored.truncate(limit);
    scored
}

/// Scores unwatched items against a user profile
pub struct RecommendationEngine {
    movie_filters: FilterPipeline,
    series_filters: FilterPipeline,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            movie_filters: Self::filters_for(MediaKind::Movie),
            series_filters: Self::filters_for(MediaKind::Series),
        }
    }

    fn filters_for(kind: MediaKind) -> FilterPipeline {
        FilterPipeline::new()
            .add_filter(MediaKindFilter::new(kind))
            .add_filter(AlreadyWatchedFilter)
            .add_filter(MissingEmbeddingFilter)
    }

    fn filters(&self, kind: MediaKind) -> &FilterPipeline {
        match kind {
            MediaKind::Movie => &self.movie_filters,
            MediaKind::Series => &self.series_filters,
        }
    }

    /// Top `limit` unwatched items of `kind` for this profile.
    ///
    /// A missing profile, or one with a zero vector, yields an empty list.
    /// Fewer eligible candidates than `limit` yields a shorter list.
    pub fn recommend(
        &self,
        profile: Option<&UserProfile>,
        embeddings: &EmbeddingMap,
        library: &LibraryIndex,
        kind: MediaKind,
        limit: usize,
    ) -> Result<Vec<ScoredItem>> {
        let Some(profile) = profile else {
            return Ok(Vec::new());
        };
        if let Some(embedding) = embeddings.values().next() {
            if embedding.vector.len() != profile.vector.len() {
                return Err(FeatureError::LengthMismatch {
                    argument: "profile",
                    expected: embedding.vector.len(),
                    found: profile.vector.len(),
                }
                .into());
            }
        }
        if limit == 0 || magnitude(&profile.vector) == 0.0 {
            return Ok(Vec::new());
        }

        let candidates: Vec<Candidate> = library
            .items()
            .iter()
            .map(|item| Candidate::new(item.id.clone(), item.kind))
            .collect();
        let context = CandidateContext {
            profile,
            embeddings,
        };
        let eligible = self.filters(kind).apply(candidates, &context);

        let scored = eligible
            .into_par_iter()
            .filter_map(|candidate| {
                let embedding = embeddings.get(&candidate.item_id)?;
                Some(
                    cosine_similarity(&profile.vector, &embedding.vector).map(|score| ScoredItem {
                        item_id: candidate.item_id,
                        score,
                    }),
                )
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            "Scored {} {} candidates for user {}",
            scored.len(),
            kind,
            profile.user_id
        );
        Ok(rank(scored, limit))
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}
