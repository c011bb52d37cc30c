//! Human-readable reasons for a recommendation.
//!
//! Lists the candidate's genres, directors, actors and tags that also
//! appear somewhere in the user's watched items.

use catalog::MediaItem;
use features::FeatureCategory;
use serde::Serialize;
use std::collections::HashSet;

/// At most this many values are reported per category
pub const MAX_SHARED_PER_CATEGORY: usize = 3;

/// Order in which reasons are reported
const REASON_ORDER: [FeatureCategory; 4] = [
    FeatureCategory::Genre,
    FeatureCategory::Director,
    FeatureCategory::Actor,
    FeatureCategory::Tag,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedFeatures {
    pub category: FeatureCategory,
    pub values: Vec<String>,
}

/// Features of `candidate` that also occur in `watched`, in the candidate's own order
pub fn shared_features<'a>(
    candidate: &MediaItem,
    watched: impl IntoIterator<Item = &'a MediaItem>,
) -> Vec<SharedFeatures> {
    let watched: Vec<&MediaItem> = watched.into_iter().collect();

    REASON_ORDER
        .iter()
        .filter_map(|&category| {
            let seen: HashSet<&str> = watched
                .iter()
                .flat_map(|item| category.values_of(item))
                .map(|v| v.as_str())
                .collect();
            let values: Vec<String> = category
                .values_of(candidate)
                .iter()
                .filter(|v| seen.contains(v.as_str()))
                .take(MAX_SHARED_PER_CATEGORY)
                .cloned()
                .collect();
            (!values.is_empty()).then_some(SharedFeatures { category, values })
        })
        .collect()
}

/// One-line summary, e.g. "Shares genres: Action, Science Fiction; directors: Lana Wachowski"
pub fn describe(shared: &[SharedFeatures], score: f32) -> String {
    if shared.is_empty() {
        return format!("Similarity {:.3}", score);
    }
    let parts: Vec<String> = shared
        .iter()
        .map(|s| format!("{}: {}", s.category.label(), s.values.join(", ")))
        .collect();
    format!("Similarity {:.3}. Shares {}", score, parts.join("; "))
}
