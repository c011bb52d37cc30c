//! Vocabulary building.
//!
//! Scans the catalog once and assigns every retained feature value an index
//! inside its category. Each category keeps only its K most frequent values
//! (frequency = number of items carrying the value); ties keep the order in
//! which values were first seen while walking the catalog.

use catalog::MediaItem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{FeatureError, Result};

/// The four categorical feature families, in embedding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Genre,
    Actor,
    Director,
    Tag,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 4] = [
        FeatureCategory::Genre,
        FeatureCategory::Actor,
        FeatureCategory::Director,
        FeatureCategory::Tag,
    ];

    /// The item's values for this category
    pub fn values_of(self, item: &MediaItem) -> &[String] {
        match self {
            FeatureCategory::Genre => &item.genres,
            FeatureCategory::Actor => &item.actors,
            FeatureCategory::Director => &item.directors,
            FeatureCategory::Tag => &item.tags,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeatureCategory::Genre => "genres",
            FeatureCategory::Actor => "actors",
            FeatureCategory::Director => "directors",
            FeatureCategory::Tag => "tags",
        }
    }
}

/// Maximum number of distinct values kept per category. `None` = uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyCaps {
    pub genres: Option<usize>,
    pub actors: Option<usize>,
    pub directors: Option<usize>,
    pub tags: Option<usize>,
}

impl Default for VocabularyCaps {
    fn default() -> Self {
        Self {
            genres: None,
            actors: Some(250),
            directors: Some(100),
            tags: Some(100),
        }
    }
}

impl VocabularyCaps {
    /// No category capped
    pub fn unlimited() -> Self {
        Self {
            genres: None,
            actors: None,
            directors: None,
            tags: None,
        }
    }

    pub fn cap(&self, category: FeatureCategory) -> Option<usize> {
        match category {
            FeatureCategory::Genre => self.genres,
            FeatureCategory::Actor => self.actors,
            FeatureCategory::Director => self.directors,
            FeatureCategory::Tag => self.tags,
        }
    }

    /// A cap of zero would make the category pointless
    pub fn validate(&self) -> Result<()> {
        for category in FeatureCategory::ALL {
            if self.cap(category) == Some(0) {
                return Err(FeatureError::InvalidArgument {
                    argument: category.label(),
                    value: "0".to_string(),
                    reason: "vocabulary cap must be >= 1",
                });
            }
        }
        Ok(())
    }
}

/// Indexed values of one category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryVocabulary {
    /// Values in index order
    terms: Vec<String>,
    /// Number of catalog items carrying each value, aligned with `terms`
    document_frequency: Vec<usize>,
    index: HashMap<String, usize>,
}

impl CategoryVocabulary {
    /// Count, rank and cap one category across the catalog
    fn build(items: &[MediaItem], category: FeatureCategory, cap: Option<usize>) -> Self {
        // value -> (count, first seen position)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut seen = 0usize;

        for item in items {
            let values = category.values_of(item);
            for (i, value) in values.iter().enumerate() {
                // each item counts a value once
                if values[..i].contains(value) {
                    continue;
                }
                let entry = counts.entry(value.as_str()).or_insert_with(|| {
                    let first = seen;
                    seen += 1;
                    (0, first)
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(value, (count, first))| (value, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        if let Some(cap) = cap {
            ranked.truncate(cap);
        }

        let mut vocab = CategoryVocabulary::default();
        for (idx, (value, count, _)) in ranked.into_iter().enumerate() {
            vocab.terms.push(value.to_string());
            vocab.document_frequency.push(count);
            vocab.index.insert(value.to_string(), idx);
        }
        vocab
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// value -> index map
    pub fn index(&self) -> &HashMap<String, usize> {
        &self.index
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// (value, item count) pairs in index order
    pub fn frequencies(&self) -> impl Iterator<Item = (&str, usize)> {
        self.terms
            .iter()
            .map(|t| t.as_str())
            .zip(self.document_frequency.iter().copied())
    }
}

/// The per-category index spaces shared by TF-IDF and embedding assembly
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    pub genres: CategoryVocabulary,
    pub actors: CategoryVocabulary,
    pub directors: CategoryVocabulary,
    pub tags: CategoryVocabulary,
}

impl Vocabulary {
    /// Build the vocabulary from the full catalog.
    ///
    /// Deterministic for a given catalog and traversal order.
    pub fn build(items: &[MediaItem], caps: &VocabularyCaps) -> Result<Self> {
        caps.validate()?;
        let vocabulary = Self {
            genres: CategoryVocabulary::build(items, FeatureCategory::Genre, caps.genres),
            actors: CategoryVocabulary::build(items, FeatureCategory::Actor, caps.actors),
            directors: CategoryVocabulary::build(items, FeatureCategory::Director, caps.directors),
            tags: CategoryVocabulary::build(items, FeatureCategory::Tag, caps.tags),
        };
        debug!(
            "Vocabulary built: {} genres, {} actors, {} directors, {} tags",
            vocabulary.genres.len(),
            vocabulary.actors.len(),
            vocabulary.directors.len(),
            vocabulary.tags.len()
        );
        Ok(vocabulary)
    }

    pub fn category(&self, category: FeatureCategory) -> &CategoryVocabulary {
        match category {
            FeatureCategory::Genre => &self.genres,
            FeatureCategory::Actor => &self.actors,
            FeatureCategory::Director => &self.directors,
            FeatureCategory::Tag => &self.tags,
        }
    }

    /// Sum of the four category sizes
    pub fn total_dimension(&self) -> usize {
        FeatureCategory::ALL
            .iter()
            .map(|&c| self.category(c).len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::MediaKind;

    fn item(id: &str, genres: &[&str], actors: &[&str]) -> MediaItem {
        let mut item = MediaItem::new(id, id, MediaKind::Movie);
        item.genres = genres.iter().map(|s| s.to_string()).collect();
        item.actors = actors.iter().map(|s| s.to_string()).collect();
        item
    }

    #[test]
    fn test_frequency_ranking_with_first_seen_ties() {
        let items = vec![
            item("1", &["Drama", "Comedy"], &[]),
            item("2", &["Action", "Comedy"], &[]),
            item("3", &["Action", "Horror"], &[]),
        ];
        let vocab = Vocabulary::build(&items, &VocabularyCaps::unlimited()).unwrap();

        // Comedy(2, first seen 1), Action(2, seen 2), Drama(1, seen 0), Horror(1, seen 3)
        assert_eq!(vocab.genres.terms(), &["Comedy", "Action", "Drama", "Horror"]);
        assert_eq!(vocab.genres.index_of("Comedy"), Some(0));
        assert_eq!(vocab.genres.index_of("Horror"), Some(3));
        assert_eq!(vocab.genres.index_of("Western"), None);
    }

    #[test]
    fn test_caps_keep_most_frequent() {
        let items = vec![
            item("1", &[], &["A", "B", "C"]),
            item("2", &[], &["C", "B"]),
            item("3", &[], &["C"]),
        ];
        let caps = VocabularyCaps {
            actors: Some(2),
            ..VocabularyCaps::unlimited()
        };
        let vocab = Vocabulary::build(&items, &caps).unwrap();

        assert_eq!(vocab.actors.terms(), &["C", "B"]);
        let freqs: Vec<(&str, usize)> = vocab.actors.frequencies().collect();
        assert_eq!(freqs, vec![("C", 3), ("B", 2)]);
        assert_eq!(vocab.total_dimension(), 2);
    }

    #[test]
    fn test_duplicate_values_in_one_item_count_once() {
        let items = vec![item("1", &["Drama", "Drama"], &[]), item("2", &["Comedy"], &[])];
        let vocab = Vocabulary::build(&items, &VocabularyCaps::unlimited()).unwrap();
        let freqs: Vec<(&str, usize)> = vocab.genres.frequencies().collect();
        assert_eq!(freqs, vec![("Drama", 1), ("Comedy", 1)]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let items: Vec<MediaItem> = (0..50)
            .map(|i| {
                let genre = format!("g{}", i % 7);
                let actor = format!("a{}", i % 13);
                item(&i.to_string(), &[genre.as_str()], &[actor.as_str()])
            })
            .collect();
        let caps = VocabularyCaps {
            actors: Some(5),
            ..VocabularyCaps::default()
        };
        let first = Vocabulary::build(&items, &caps).unwrap();
        let second = Vocabulary::build(&items, &caps).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.actors.len(), 5);
    }

    #[test]
    fn test_zero_cap_rejected() {
        let caps = VocabularyCaps {
            tags: Some(0),
            ..VocabularyCaps::default()
        };
        assert!(Vocabulary::build(&[], &caps).is_err());
    }

    #[test]
    fn test_empty_catalog() {
        let vocab = Vocabulary::build(&[], &VocabularyCaps::default()).unwrap();
        assert_eq!(vocab.total_dimension(), 0);
        assert!(vocab.tags.is_empty());
    }
}
