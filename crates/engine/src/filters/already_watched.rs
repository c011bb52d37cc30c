//! Filter to remove items the user has already watched.

use crate::traits::{Candidate, CandidateContext, Filter};

/// Removes candidates present in the profile's exclusion set.
pub struct AlreadyWatchedFilter;

impl Filter for AlreadyWatchedFilter {
    fn name(&self) -> &str {
        "AlreadyWatchedFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &CandidateContext<'_>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|candidate| !context.profile.has_watched(&candidate.item_id))
            .collect()
    }
}
