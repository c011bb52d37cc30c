//! Filter that keeps one media kind.

use catalog::MediaKind;

use crate::traits::{Candidate, CandidateContext, Filter};

/// Keeps only candidates of the requested kind
pub struct MediaKindFilter {
    kind: MediaKind,
}

impl MediaKindFilter {
    pub fn new(kind: MediaKind) -> Self {
        Self { kind }
    }
}

impl Filter for MediaKindFilter {
    fn name(&self) -> &str {
        "MediaKindFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, _context: &CandidateContext<'_>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|candidate| candidate.kind == self.kind)
            .collect()
    }
}
