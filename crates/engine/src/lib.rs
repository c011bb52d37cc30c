//! Profile building, candidate filtering and ranking.
//!
//! This crate provides:
//! - RecommenderConfig with validation and JSON loading
//! - ProfileBuilder for turning watch history into a taste vector
//! - Filter trait and FilterPipeline for candidate eligibility
//! - RecommendationEngine for cosine scoring and top-N ranking
//! - RecommendationPipeline for full batch refreshes
//!
//! ## Architecture
//! A run moves through four phases:
//! 1. Vocabulary is built from the catalog
//! 2. Every item is embedded
//! 3. Every user with history gets a profile (or is marked cold start)
//! 4. Movies and series are scored and ranked per user
//!
//! ## Example Usage
//! ```ignore
//! use engine::{CancellationToken, RecommendationPipeline, RecommenderConfig};
//!
//! let pipeline = RecommendationPipeline::new(RecommenderConfig::default())?
//!     .with_progress(|event| println!("{:?}", event));
//!
//! let results = pipeline.run(&library, now, &CancellationToken::new())?;
//! for (user, recs) in &results {
//!     println!("{}: {} movies, {} series", user, recs.movies.len(), recs.series.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod explain;
pub mod filter_pipeline;
pub mod filters;
pub mod orchestrator;
pub mod profile;
pub mod recommender;
pub mod traits;

// Re-export main types
pub use config::RecommenderConfig;
pub use error::{EngineError, Result};
pub use explain::SharedFeatures;
pub use features::CancellationToken;
pub use filter_pipeline::FilterPipeline;
pub use orchestrator::{
    CatalogModel, ProgressEvent, Recommendation, RecommendationPipeline, UserRecommendations,
};
pub use profile::{ProfileBuilder, UserProfile};
pub use recommender::{RecommendationEngine, ScoredItem};
pub use traits::{Candidate, CandidateContext, Filter};
