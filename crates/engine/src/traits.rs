//! Core traits for candidate selection.
//!
//! A recommendation candidate must survive every `Filter` in the
//! `FilterPipeline` before it is scored.

use catalog::{ItemId, MediaKind};
use features::EmbeddingMap;

use crate::profile::UserProfile;

/// An item considered for recommendation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub item_id: ItemId,
    pub kind: MediaKind,
}

impl Candidate {
    pub fn new(item_id: impl Into<ItemId>, kind: MediaKind) -> Self {
        Self {
            item_id: item_id.into(),
            kind,
        }
    }
}

/// What filters may look at while deciding
#[derive(Debug, Clone, Copy)]
pub struct CandidateContext<'a> {
    pub profile: &'a UserProfile,
    pub embeddings: &'a EmbeddingMap,
}

/// Core trait for filtering candidates.
///
/// ## Design Note
/// - `Send + Sync` so one pipeline can serve many users concurrently
/// - Filters take ownership of the Vec<Candidate> and return the survivors
/// - Filtering never fails: missing data just drops the candidate
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    fn apply(&self, candidates: Vec<Candidate>, context: &CandidateContext<'_>) -> Vec<Candidate>;
}
