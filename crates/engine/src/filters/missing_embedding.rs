//! Filter for items that were never embedded.
//!
//! An item can be in the catalog without an embedding when it was added
//! after the last refresh. Such items can't be scored, so they are dropped.

use crate::traits::{Candidate, CandidateContext, Filter};

pub struct MissingEmbeddingFilter;

impl Filter for MissingEmbeddingFilter {
    fn name(&self) -> &str {
        "MissingEmbeddingFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &CandidateContext<'_>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|candidate| context.embeddings.contains_key(&candidate.item_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::UserProfile;
    use catalog::MediaKind;
    use features::{EmbeddingMap, ItemEmbedding};
    use std::collections::HashSet;

    #[test]
    fn test_drops_items_without_embedding() {
        let profile = UserProfile {
            user_id: "u1".to_string(),
            vector: vec![1.0],
            watched_item_count: 0,
            watched_items: HashSet::new(),
        };
        let mut embeddings = EmbeddingMap::new();
        embeddings.insert(
            "known".to_string(),
            ItemEmbedding {
                item_id: "known".to_string(),
                vector: vec![1.0],
            },
        );
        let context = CandidateContext {
            profile: &profile,
            embeddings: &embeddings,
        };

        let filtered = MissingEmbeddingFilter.apply(
            vec![
                Candidate::new("known", MediaKind::Movie),
                Candidate::new("new-arrival", MediaKind::Movie),
            ],
            &context,
        );

        assert_eq!(filtered, vec![Candidate::new("known", MediaKind::Movie)]);
    }
}
