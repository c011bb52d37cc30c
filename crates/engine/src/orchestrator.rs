//! # Recommendation Pipeline
//!
//! Coordinates a full batch refresh:
//! 1. Build the vocabulary from the catalog
//! 2. Compute item embeddings (parallel over items)
//! 3. Build user profiles (parallel over users)
//! 4. Score and rank movies and series for every user (parallel over users)
//!
//! A progress callback, when set, fires once at the end of each phase.
//! Every phase checks the cancellation token between items or users; a
//! cancelled run returns `EngineError::Cancelled` and no partial output.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use catalog::{ItemId, LibraryIndex, MediaKind, Timestamp, UserId};
use features::{CancellationToken, EmbeddingMap, EmbeddingSpace, Vocabulary};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::RecommenderConfig;
use crate::error::Result;
use crate::explain::{describe, shared_features, SharedFeatures};
use crate::profile::{ProfileBuilder, UserProfile};
use crate::recommender::{RecommendationEngine, ScoredItem};

/// Phase boundaries reported to the progress callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    VocabularyBuilt { features: usize, dimension: usize },
    EmbeddingsComputed { items: usize },
    ProfilesBuilt { profiles: usize, cold_start: usize },
    ScoringComplete { users: usize },
}

pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Final recommendation handed to the output consumer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub name: String,
    pub kind: MediaKind,
    pub year: Option<u16>,
    pub score: f32,
    pub reasons: Vec<SharedFeatures>,
    pub explanation: String,
}

/// Both ranked lists for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecommendations {
    pub user_id: UserId,
    /// No usable watch history, so no profile could be built
    pub cold_start: bool,
    pub watched_item_count: usize,
    pub movies: Vec<Recommendation>,
    pub series: Vec<Recommendation>,
}

impl UserRecommendations {
    fn cold_start(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            cold_start: true,
            watched_item_count: 0,
            movies: Vec::new(),
            series: Vec::new(),
        }
    }

    pub fn for_kind(&self, kind: MediaKind) -> &[Recommendation] {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Series => &self.series,
        }
    }
}

/// The fitted feature space plus every item's embedding
#[derive(Debug, Clone)]
pub struct CatalogModel {
    space: EmbeddingSpace,
    embeddings: EmbeddingMap,
}

impl CatalogModel {
    pub fn space(&self) -> &EmbeddingSpace {
        &self.space
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.space.vocabulary()
    }

    pub fn embeddings(&self) -> &EmbeddingMap {
        &self.embeddings
    }

    pub fn dimension(&self) -> usize {
        self.space.dimension()
    }
}

/// Main entry point that runs the recommendation phases
#[derive(Clone)]
pub struct RecommendationPipeline {
    config: RecommenderConfig,
    profiles: ProfileBuilder,
    engine: Arc<RecommendationEngine>,
    progress: Option<ProgressCallback>,
}

impl RecommendationPipeline {
    /// Create a pipeline; fails if the configuration is invalid
    pub fn new(config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            profiles: ProfileBuilder::new(config.weights()),
            config,
            engine: Arc::new(RecommendationEngine::new()),
            progress: None,
        })
    }

    /// Register a callback invoked at each phase boundary
    pub fn with_progress(mut self, callback: impl Fn(&ProgressEvent) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    fn report(&self, event: ProgressEvent) {
        if let Some(callback) = &self.progress {
            callback(&event);
        }
    }

    /// Build the vocabulary and embed the whole catalog
    pub fn fit(&self, library: &LibraryIndex, cancel: &CancellationToken) -> Result<CatalogModel> {
        let start = Instant::now();
        cancel.check()?;

        let items = library.items();
        let vocabulary = Vocabulary::build(items, &self.config.vocabulary)?;
        let space = EmbeddingSpace::from_vocabulary(items, vocabulary)?;
        info!(
            "Vocabulary built: {} features, embedding dimension {}",
            space.vocabulary().total_dimension(),
            space.dimension()
        );
        self.report(ProgressEvent::VocabularyBuilt {
            features: space.vocabulary().total_dimension(),
            dimension: space.dimension(),
        });

        let embeddings = space.embed_all(items, cancel)?;
        self.report(ProgressEvent::EmbeddingsComputed {
            items: embeddings.len(),
        });

        info!("Catalog model fitted in {:.2?}", start.elapsed());
        Ok(CatalogModel { space, embeddings })
    }

    /// Build one user's profile; `None` for cold-start users
    pub fn build_profile(
        &self,
        model: &CatalogModel,
        library: &LibraryIndex,
        user_id: &str,
        now: Timestamp,
    ) -> Result<Option<UserProfile>> {
        let history = library.user_history(user_id);
        self.profiles.build(user_id, &history, &model.embeddings, now)
    }

    /// Score both media kinds for a profile
    pub fn score_profile(
        &self,
        model: &CatalogModel,
        library: &LibraryIndex,
        user_id: &str,
        profile: Option<&UserProfile>,
    ) -> Result<UserRecommendations> {
        let Some(profile) = profile else {
            return Ok(UserRecommendations::cold_start(user_id));
        };

        let movies = self.ranked(model, library, profile, MediaKind::Movie)?;
        let series = self.ranked(model, library, profile, MediaKind::Series)?;

        Ok(UserRecommendations {
            user_id: user_id.to_string(),
            cold_start: false,
            watched_item_count: profile.watched_item_count,
            movies,
            series,
        })
    }

    fn ranked(
        &self,
        model: &CatalogModel,
        library: &LibraryIndex,
        profile: &UserProfile,
        kind: MediaKind,
    ) -> Result<Vec<Recommendation>> {
        let scored = self.engine.recommend(
            Some(profile),
            &model.embeddings,
            library,
            kind,
            self.config.result_count(kind),
        )?;
        Ok(self.decorate(library, profile, scored))
    }

    /// Attach metadata and reasons to scored items
    fn decorate(
        &self,
        library: &LibraryIndex,
        profile: &UserProfile,
        scored: Vec<ScoredItem>,
    ) -> Vec<Recommendation> {
        let watched: Vec<_> = profile
            .watched_items
            .iter()
            .filter_map(|id| library.get_item(id))
            .collect();

        scored
            .into_iter()
            .filter_map(|scored| {
                let item = library.get_item(&scored.item_id)?;
                let reasons = shared_features(item, watched.iter().copied());
                Some(Recommendation {
                    explanation: describe(&reasons, scored.score),
                    item_id: scored.item_id,
                    name: item.name.clone(),
                    kind: item.kind,
                    year: item.year,
                    score: scored.score,
                    reasons,
                })
            })
            .collect()
    }

    /// Recommendations for a single user against an already fitted model
    #[instrument(skip(self, model, library))]
    pub fn recommend_for_user(
        &self,
        model: &CatalogModel,
        library: &LibraryIndex,
        user_id: &str,
        now: Timestamp,
    ) -> Result<UserRecommendations> {
        let profile = self.build_profile(model, library, user_id, now)?;
        self.score_profile(model, library, user_id, profile.as_ref())
    }

    /// Full batch refresh for every user with watch history
    pub fn run(
        &self,
        library: &LibraryIndex,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<UserId, UserRecommendations>> {
        let start = Instant::now();
        let model = self.fit(library, cancel)?;
        let results = self.run_with_model(&model, library, now, cancel)?;
        info!(
            "Recommendation run finished for {} users in {:.2?}",
            results.len(),
            start.elapsed()
        );
        Ok(results)
    }

    /// Profile and score every user against a fitted model
    pub fn run_with_model(
        &self,
        model: &CatalogModel,
        library: &LibraryIndex,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<UserId, UserRecommendations>> {
        let users: Vec<&UserId> = library.user_ids().collect();

        let start = Instant::now();
        let profiles = users
            .par_iter()
            .map(|&user_id| -> Result<(UserId, Option<UserProfile>)> {
                cancel.check()?;
                let profile = self.build_profile(model, library, user_id, now)?;
                Ok((user_id.clone(), profile))
            })
            .collect::<Result<Vec<_>>>()?;

        let cold_start = profiles.iter().filter(|(_, p)| p.is_none()).count();
        info!(
            "Built {} profiles ({} cold start) in {:.2?}",
            profiles.len() - cold_start,
            cold_start,
            start.elapsed()
        );
        self.report(ProgressEvent::ProfilesBuilt {
            profiles: profiles.len() - cold_start,
            cold_start,
        });

        let start = Instant::now();
        let results = profiles
            .par_iter()
            .map(|(user_id, profile)| -> Result<(UserId, UserRecommendations)> {
                cancel.check()?;
                let recs = self.score_profile(model, library, user_id, profile.as_ref())?;
                Ok((user_id.clone(), recs))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        info!("Scored {} users in {:.2?}", results.len(), start.elapsed());
        self.report(ProgressEvent::ScoringComplete {
            users: results.len(),
        });
        Ok(results)
    }
}
