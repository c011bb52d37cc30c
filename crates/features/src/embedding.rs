//! Item embedding assembly.
//!
//! An embedding is the concatenation of four TF-IDF sub-vectors (genre,
//! actor, director, tag) followed by three scalar signals scaled to [0, 1]:
//! release year, community rating and critic rating.
//!
//! ## Performance Note
//! Embedding the catalog is the dominant cost of a refresh. Items are
//! independent, so `embed_all` fans out over Rayon; the fitted space is
//! read-only and shared without locks.

use catalog::{ItemId, MediaItem};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::tfidf::{build_vector, compute_tf_idf, idf_table, normalize_scalar};
use crate::vocabulary::{FeatureCategory, Vocabulary, VocabularyCaps};

/// Year, community rating, critic rating
pub const SCALAR_FEATURE_COUNT: usize = 3;

/// Community ratings are published on a 0-10 scale
pub const COMMUNITY_RATING_SCALE: (f32, f32) = (0.0, 10.0);

/// Critic ratings are published on a 0-100 scale
pub const CRITIC_RATING_SCALE: (f32, f32) = (0.0, 100.0);

/// Value used for scalar metadata the item doesn't have
pub const MISSING_SCALAR: f32 = 0.5;

/// A scalar field that is either known or explicitly missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarSignal {
    Present(f32),
    Missing,
}

impl ScalarSignal {
    /// NaN counts as missing
    pub fn from_option(value: Option<f32>) -> Self {
        match value {
            Some(v) if !v.is_nan() => ScalarSignal::Present(v),
            _ => ScalarSignal::Missing,
        }
    }

    /// Scale into [0, 1]; missing values sit at the midpoint
    pub fn normalized(self, min: f32, max: f32) -> Result<f32> {
        match self {
            ScalarSignal::Present(v) => normalize_scalar(v, min, max),
            ScalarSignal::Missing => Ok(MISSING_SCALAR),
        }
    }
}

/// Dense feature vector for one catalog item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEmbedding {
    pub item_id: ItemId,
    pub vector: Vec<f32>,
}

/// Item id -> embedding, the artifact consumed by profiling and scoring
pub type EmbeddingMap = HashMap<ItemId, ItemEmbedding>;

/// Everything fitted from the catalog that is needed to embed an item
#[derive(Debug, Clone)]
pub struct EmbeddingSpace {
    vocabulary: Vocabulary,
    /// Indexed by `FeatureCategory as usize`
    idf: [HashMap<String, f32>; 4],
    /// Catalog-wide (min, max) release year, when at least two years differ
    year_range: Option<(f32, f32)>,
}

impl EmbeddingSpace {
    /// Fit the vocabulary, IDF tables and year range on the full catalog
    pub fn fit(items: &[MediaItem], caps: &VocabularyCaps) -> Result<Self> {
        let vocabulary = Vocabulary::build(items, caps)?;
        Self::from_vocabulary(items, vocabulary)
    }

    /// Fit IDF tables and year range for an already built vocabulary
    pub fn from_vocabulary(items: &[MediaItem], vocabulary: Vocabulary) -> Result<Self> {
        let total = items.len();
        let idf = [
            idf_table(&vocabulary.genres, total)?,
            idf_table(&vocabulary.actors, total)?,
            idf_table(&vocabulary.directors, total)?,
            idf_table(&vocabulary.tags, total)?,
        ];
        let year_range = year_range(items);
        debug!("Year range for normalization: {:?}", year_range);

        Ok(Self {
            vocabulary,
            idf,
            year_range,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self, category: FeatureCategory) -> &HashMap<String, f32> {
        &self.idf[category as usize]
    }

    pub fn year_range(&self) -> Option<(f32, f32)> {
        self.year_range
    }

    /// Length of every embedding produced by this space
    pub fn dimension(&self) -> usize {
        self.vocabulary.total_dimension() + SCALAR_FEATURE_COUNT
    }

    /// Embed a single item
    pub fn embed(&self, item: &MediaItem) -> Result<ItemEmbedding> {
        let mut vector = Vec::with_capacity(self.dimension());

        for category in FeatureCategory::ALL {
            let vocab = self.vocabulary.category(category);
            let scores = compute_tf_idf(category.values_of(item), self.idf(category));
            vector.extend(build_vector(&scores, vocab.index(), vocab.len())?);
        }

        vector.push(self.year_signal(item)?);
        let (lo, hi) = COMMUNITY_RATING_SCALE;
        vector.push(ScalarSignal::from_option(item.community_rating).normalized(lo, hi)?);
        let (lo, hi) = CRITIC_RATING_SCALE;
        vector.push(ScalarSignal::from_option(item.critic_rating).normalized(lo, hi)?);

        Ok(ItemEmbedding {
            item_id: item.id.clone(),
            vector,
        })
    }

    fn year_signal(&self, item: &MediaItem) -> Result<f32> {
        match self.year_range {
            Some((min, max)) => {
                ScalarSignal::from_option(item.year.map(f32::from)).normalized(min, max)
            }
            None => Ok(MISSING_SCALAR),
        }
    }

    /// Embed every item in parallel.
    ///
    /// Checks `cancel` before each item; on cancellation nothing is returned.
    pub fn embed_all(&self, items: &[MediaItem], cancel: &CancellationToken) -> Result<EmbeddingMap> {
        let start = Instant::now();
        let embeddings = items
            .par_iter()
            .map(|item| {
                cancel.check()?;
                let embedding = self.embed(item)?;
                Ok((embedding.item_id.clone(), embedding))
            })
            .collect::<Result<EmbeddingMap>>()?;

        info!(
            "Computed {} embeddings of dimension {} in {:.2?}",
            embeddings.len(),
            self.dimension(),
            start.elapsed()
        );
        Ok(embeddings)
    }
}

fn year_range(items: &[MediaItem]) -> Option<(f32, f32)> {
    let mut years = items.iter().filter_map(|item| item.year);
    let first = years.next()?;
    let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    (max > min).then(|| (f32::from(min), f32::from(max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_math::cosine_similarity;
    use catalog::MediaKind;

    fn movie(id: &str, year: Option<u16>, genres: &[&str], directors: &[&str]) -> MediaItem {
        let mut item = MediaItem::new(id, id, MediaKind::Movie);
        item.year = year;
        item.genres = genres.iter().map(|s| s.to_string()).collect();
        item.directors = directors.iter().map(|s| s.to_string()).collect();
        item
    }

    fn catalog() -> Vec<MediaItem> {
        let mut items = vec![
            movie("a", Some(1990), &["Action", "Drama"], &["Nolan"]),
            movie("b", Some(2010), &["Action"], &["Nolan"]),
            movie("c", None, &["Drama"], &["Gerwig"]),
            movie("d", Some(2000), &["Comedy"], &[]),
        ];
        items[0].community_rating = Some(8.0);
        items[1].critic_rating = Some(75.0);
        items
    }

    #[test]
    fn test_dimension_and_layout() {
        let items = catalog();
        let space = EmbeddingSpace::fit(&items, &VocabularyCaps::unlimited()).unwrap();

        // genres: Action, Drama, Comedy; directors: Nolan, Gerwig
        assert_eq!(space.vocabulary().total_dimension(), 5);
        assert_eq!(space.dimension(), 8);

        let a = space.embed(&items[0]).unwrap();
        assert_eq!(a.vector.len(), 8);

        let idf_action = (4.0f32 / 2.0).ln();
        let idf_nolan = (4.0f32 / 2.0).ln();
        assert!((a.vector[0] - idf_action).abs() < 1e-6); // Action
        assert!((a.vector[1] - idf_action).abs() < 1e-6); // Drama (also 2 of 4)
        assert_eq!(a.vector[2], 0.0); // Comedy
        assert!((a.vector[3] - idf_nolan).abs() < 1e-6); // Nolan
        assert_eq!(a.vector[4], 0.0); // Gerwig
        assert_eq!(a.vector[5], 0.0); // year 1990 is the minimum
        assert!((a.vector[6] - 0.8).abs() < 1e-6); // community 8/10
        assert_eq!(a.vector[7], MISSING_SCALAR); // no critic rating
    }

    #[test]
    fn test_missing_scalars_use_midpoint() {
        let items = catalog();
        let space = EmbeddingSpace::fit(&items, &VocabularyCaps::unlimited()).unwrap();

        let c = space.embed(&items[2]).unwrap();
        let scalars = &c.vector[5..];
        assert_eq!(scalars, &[MISSING_SCALAR, MISSING_SCALAR, MISSING_SCALAR]);

        let b = space.embed(&items[1]).unwrap();
        assert_eq!(b.vector[5], 1.0);
        assert!((b.vector[7] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_single_year_catalog_has_no_range() {
        let items = vec![
            movie("a", Some(2001), &["Action"], &[]),
            movie("b", Some(2001), &["Drama"], &[]),
        ];
        let space = EmbeddingSpace::fit(&items, &VocabularyCaps::unlimited()).unwrap();
        assert_eq!(space.year_range(), None);
        let a = space.embed(&items[0]).unwrap();
        assert_eq!(a.vector[2], MISSING_SCALAR);
    }

    #[test]
    fn test_capped_out_features_are_ignored() {
        let items = catalog();
        let caps = VocabularyCaps {
            directors: Some(1),
            ..VocabularyCaps::unlimited()
        };
        let space = EmbeddingSpace::fit(&items, &caps).unwrap();
        let c = space.embed(&items[2]).unwrap();
        // Gerwig fell off the vocabulary: only Drama remains non-zero
        assert_eq!(c.vector.len(), 3 + 1 + SCALAR_FEATURE_COUNT);
        assert!(c.vector[1] > 0.0);
        assert_eq!(c.vector[3], 0.0);
    }

    #[test]
    fn test_similar_items_are_closer() {
        let items = catalog();
        let space = EmbeddingSpace::fit(&items, &VocabularyCaps::unlimited()).unwrap();
        let map = space.embed_all(&items, &CancellationToken::new()).unwrap();

        assert_eq!(map.len(), 4);
        let sim_ab = cosine_similarity(&map["a"].vector, &map["b"].vector).unwrap();
        let sim_ad = cosine_similarity(&map["a"].vector, &map["d"].vector).unwrap();
        assert!(sim_ab > sim_ad);
    }

    #[test]
    fn test_embed_all_honours_cancellation() {
        let items = catalog();
        let space = EmbeddingSpace::fit(&items, &VocabularyCaps::unlimited()).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            space.embed_all(&items, &token),
            Err(crate::FeatureError::Cancelled)
        );
    }
}
