//! # Features Crate
//!
//! The numeric model of the recommender: how catalog items become vectors
//! and how watch events become weights.
//!
//! ## Components
//!
//! - **vector_math**: dot product, magnitude, normalization, cosine similarity
//! - **weights**: recency decay, favorite boost, rewatch boost
//! - **vocabulary**: frequency-capped index spaces for genres, actors, directors, tags
//! - **tfidf**: IDF, presence-based TF-IDF, dense projection, scalar scaling, one-hot
//! - **embedding**: fixed-length item embeddings (TF-IDF blocks + scalar signals)
//! - **cancel**: cooperative cancellation token
//!
//! ## Example Usage
//!
//! ```ignore
//! use features::{CancellationToken, EmbeddingSpace, VocabularyCaps};
//!
//! let space = EmbeddingSpace::fit(library.items(), &VocabularyCaps::default())?;
//! let embeddings = space.embed_all(library.items(), &CancellationToken::new())?;
//! println!("{} embeddings of length {}", embeddings.len(), space.dimension());
//! ```

pub mod cancel;
pub mod embedding;
pub mod error;
pub mod tfidf;
pub mod vector_math;
pub mod vocabulary;
pub mod weights;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use embedding::{
    EmbeddingMap, EmbeddingSpace, ItemEmbedding, ScalarSignal, SCALAR_FEATURE_COUNT,
};
pub use error::{FeatureError, Result};
pub use vocabulary::{CategoryVocabulary, FeatureCategory, Vocabulary, VocabularyCaps};
pub use weights::WeightParams;
