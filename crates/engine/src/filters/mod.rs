//! Filter implementations for candidate selection.

pub mod already_watched;
pub mod media_kind;
pub mod missing_embedding;

// Re-export for convenience
pub use already_watched::AlreadyWatchedFilter;
pub use media_kind::MediaKindFilter;
pub use missing_embedding::MissingEmbeddingFilter;
