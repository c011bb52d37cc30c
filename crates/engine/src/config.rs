//! Recommender configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. `validate` runs before any computation; a pipeline can't be
//! built from an invalid config.

use catalog::MediaKind;
use features::{VocabularyCaps, WeightParams};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Per-category vocabulary caps
    pub vocabulary: VocabularyCaps,
    /// Days after which a watch event's weight halves
    pub decay_half_life_days: f32,
    /// Multiplier applied to favorites
    pub favorite_boost: f32,
    /// Logarithm base of the rewatch boost
    pub rewatch_base: f32,
    /// Movies to return per user
    pub movie_count: usize,
    /// Series to return per user
    pub series_count: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        let weights = WeightParams::default();
        Self {
            vocabulary: VocabularyCaps::default(),
            decay_half_life_days: weights.half_life_days,
            favorite_boost: weights.favorite_boost,
            rewatch_base: weights.rewatch_base,
            movie_count: 20,
            series_count: 10,
        }
    }
}

impl RecommenderConfig {
    /// Decode a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    /// Configure the vocabulary caps
    pub fn with_vocabulary(mut self, caps: VocabularyCaps) -> Self {
        self.vocabulary = caps;
        self
    }

    /// Configure the decay half-life in days (default: 90)
    pub fn with_decay_half_life_days(mut self, days: f32) -> Self {
        self.decay_half_life_days = days;
        self
    }

    /// Configure the favorite multiplier (default: 1.5)
    pub fn with_favorite_boost(mut self, boost: f32) -> Self {
        self.favorite_boost = boost;
        self
    }

    /// Configure the rewatch logarithm base (default: 2)
    pub fn with_rewatch_base(mut self, base: f32) -> Self {
        self.rewatch_base = base;
        self
    }

    /// Configure result counts (defaults: 20 movies, 10 series)
    pub fn with_result_counts(mut self, movies: usize, series: usize) -> Self {
        self.movie_count = movies;
        self.series_count = series;
        self
    }

    pub fn weights(&self) -> WeightParams {
        WeightParams {
            half_life_days: self.decay_half_life_days,
            favorite_boost: self.favorite_boost,
            rewatch_base: self.rewatch_base,
        }
    }

    /// How many results to produce for a media kind
    pub fn result_count(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Movie => self.movie_count,
            MediaKind::Series => self.series_count,
        }
    }

    /// Reject values the weight and vocabulary formulas can't work with
    pub fn validate(&self) -> Result<()> {
        self.vocabulary
            .validate()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        self.weights()
            .validate()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        Ok(())
    }
}
