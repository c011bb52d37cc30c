//! Error types for the catalog crate.
//!
//! Everything that can go wrong while reading the catalog and watch-history
//! collaborators, or while validating what they handed us.

use thiserror::Error;

/// Errors that can occur while loading or validating library data
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A JSON document couldn't be decoded
    #[error("Parse error in {file}: {source}")]
    ParseError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two catalog entries share the same id
    #[error("Duplicate item id in catalog: {id}")]
    DuplicateItem { id: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
