//! Error types for the features crate.
//!
//! Only malformed numeric input, broken invariants and cancellation are
//! errors here. Missing metadata (unknown vocabulary values, absent ratings)
//! is never reported; it degrades to zeros or midpoints instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// A vector or list argument was empty
    #[error("Argument '{argument}' must not be empty")]
    EmptyVector { argument: &'static str },

    /// Two vectors that must line up have different lengths
    #[error("Length mismatch for '{argument}': expected {expected}, found {found}")]
    LengthMismatch {
        argument: &'static str,
        expected: usize,
        found: usize,
    },

    /// A scalar argument is outside its valid domain
    #[error("Invalid value for '{argument}': {value} ({reason})")]
    InvalidArgument {
        argument: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A vocabulary index points outside the vector being built
    #[error("Vocabulary index {index} for feature '{feature}' is out of bounds for size {size}")]
    IndexOutOfBounds {
        feature: String,
        index: usize,
        size: usize,
    },

    /// The caller asked the computation to stop
    #[error("Operation cancelled")]
    Cancelled,
}

impl FeatureError {
    pub(crate) fn invalid(argument: &'static str, value: impl ToString, reason: &'static str) -> Self {
        FeatureError::InvalidArgument {
            argument,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;
