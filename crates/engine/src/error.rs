//! Error types for the engine crate.

use features::FeatureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected before any computation ran
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed numeric input or a broken invariant inside the model
    #[error(transparent)]
    Feature(FeatureError),

    /// The run was cancelled; no partial results were produced
    #[error("Recommendation run cancelled")]
    Cancelled,
}

impl From<FeatureError> for EngineError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::Cancelled => EngineError::Cancelled,
            other => EngineError::Feature(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_maps_to_its_own_variant() {
        assert!(matches!(EngineError::from(FeatureError::Cancelled), EngineError::Cancelled));
        assert!(matches!(
            EngineError::from(FeatureError::EmptyVector { argument: "a" }),
            EngineError::Feature(_)
        ));
    }
}
