//! User profile building.
//!
//! A profile is the weighted sum of the embeddings of everything the user
//! watched, each weighted by recency, favorite flag and play count. It is
//! deliberately left unnormalized: heavy viewers get larger profiles.

use catalog::{ItemId, Timestamp, WatchRecord};
use features::vector_math::weighted_sum;
use features::{EmbeddingMap, WeightParams};
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::error::Result;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A user's taste vector plus what they have already seen
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    /// Same length as every item embedding
    pub vector: Vec<f32>,
    /// Number of watch records that contributed
    pub watched_item_count: usize,
    /// Contributing items, excluded from recommendations
    pub watched_items: HashSet<ItemId>,
}

impl UserProfile {
    pub fn has_watched(&self, item_id: &str) -> bool {
        self.watched_items.contains(item_id)
    }
}

/// Age of a play in days. Plays stamped after `now` count as fresh.
pub fn days_since(last_played: Timestamp, now: Timestamp) -> f32 {
    (now.saturating_sub(last_played).max(0) as f64 / SECONDS_PER_DAY) as f32
}

/// Builds profiles from watch records and item embeddings
#[derive(Debug, Clone, Copy)]
pub struct ProfileBuilder {
    weights: WeightParams,
}

impl ProfileBuilder {
    pub fn new(weights: WeightParams) -> Self {
        Self { weights }
    }

    /// Build one user's profile.
    ///
    /// Records whose item has no embedding are skipped. Returns `Ok(None)`
    /// when nothing is left: a cold-start user, which is not an error.
    #[instrument(skip(self, records, embeddings), fields(records = records.len()))]
    pub fn build(
        &self,
        user_id: &str,
        records: &[&WatchRecord],
        embeddings: &EmbeddingMap,
        now: Timestamp,
    ) -> Result<Option<UserProfile>> {
        let mut vectors: Vec<&[f32]> = Vec::with_capacity(records.len());
        let mut weights: Vec<f32> = Vec::with_capacity(records.len());
        let mut watched_items = HashSet::with_capacity(records.len());

        for record in records {
            let Some(embedding) = embeddings.get(&record.item_id) else {
                debug!("No embedding for item {}, skipping", record.item_id);
                continue;
            };
            let weight = self.weights.combined_weight(
                days_since(record.last_played, now),
                record.is_favorite,
                record.play_count,
            )?;
            vectors.push(&embedding.vector);
            weights.push(weight);
            watched_items.insert(record.item_id.clone());
        }

        if vectors.is_empty() {
            debug!("User {} has no usable watch history", user_id);
            return Ok(None);
        }

        let vector = weighted_sum(&vectors, &weights)?;
        debug!("Built profile for {} from {} items", user_id, vectors.len());

        Ok(Some(UserProfile {
            user_id: user_id.to_string(),
            vector,
            watched_item_count: vectors.len(),
            watched_items,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use features::ItemEmbedding;

    const DAY: Timestamp = 86_400;
    const NOW: Timestamp = 1_700_000_000;

    fn embeddings() -> EmbeddingMap {
        [("a", vec![1.0, 0.0, 0.0]), ("b", vec![0.0, 1.0, 0.0])]
            .into_iter()
            .map(|(id, vector)| {
                (
                    id.to_string(),
                    ItemEmbedding {
                        item_id: id.to_string(),
                        vector,
                    },
                )
            })
            .collect()
    }

    fn record(item: &str, days_ago: i64, is_favorite: bool, play_count: u32) -> WatchRecord {
        WatchRecord {
            item_id: item.to_string(),
            user_id: "u1".to_string(),
            last_played: NOW - days_ago * DAY,
            is_favorite,
            play_count,
        }
    }

    fn builder() -> ProfileBuilder {
        ProfileBuilder::new(WeightParams {
            half_life_days: 10.0,
            favorite_boost: 2.0,
            rewatch_base: 2.0,
        })
    }

    #[test]
    fn test_days_since() {
        assert_eq!(days_since(NOW - 3 * DAY, NOW), 3.0);
        assert_eq!(days_since(NOW + DAY, NOW), 0.0);
        assert_eq!(days_since(NOW - DAY / 2, NOW), 0.5);
    }

    #[test]
    fn test_profile_is_weighted_sum() {
        let a = record("a", 0, true, 1); // 1.0 * 2 = 2.0
        let b = record("b", 10, false, 4); // 0.5 * (1 + 2) = 1.5
        let profile = builder()
            .build("u1", &[&a, &b], &embeddings(), NOW)
            .unwrap()
            .unwrap();

        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.watched_item_count, 2);
        assert!((profile.vector[0] - 2.0).abs() < 1e-5);
        assert!((profile.vector[1] - 1.5).abs() < 1e-5);
        assert_eq!(profile.vector[2], 0.0);
        assert!(profile.has_watched("a") && profile.has_watched("b"));
    }

    #[test]
    fn test_profile_is_not_normalized() {
        let a = record("a", 0, true, 8);
        let profile = builder()
            .build("u1", &[&a], &embeddings(), NOW)
            .unwrap()
            .unwrap();
        // 1.0 * 2 * (1 + log2 8) = 8
        assert!((profile.vector[0] - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_records_without_embedding_are_skipped() {
        let a = record("a", 1, false, 1);
        let gone = record("deleted", 1, true, 5);
        let profile = builder()
            .build("u1", &[&a, &gone], &embeddings(), NOW)
            .unwrap()
            .unwrap();

        assert_eq!(profile.watched_item_count, 1);
        assert!(!profile.has_watched("deleted"));
    }

    #[test]
    fn test_cold_start_yields_no_profile() {
        let gone = record("deleted", 1, false, 1);
        assert!(builder().build("u1", &[], &embeddings(), NOW).unwrap().is_none());
        assert!(builder().build("u1", &[&gone], &embeddings(), NOW).unwrap().is_none());
    }
}
