//! Parsers for the library export files.
//!
//! - catalog.json: array of `MediaItem`
//! - watch_history.json: array of `WatchRecord` (timestamps in Unix seconds)

use crate::error::{CatalogError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read and decode one JSON array file
fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_json_array(&content, &file_label(path))
}

fn parse_json_array<T: DeserializeOwned>(content: &str, file: &str) -> Result<Vec<T>> {
    serde_json::from_str(content).map_err(|source| CatalogError::ParseError {
        file: file.to_string(),
        source,
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the catalog file
pub fn parse_catalog(path: &Path) -> Result<Vec<MediaItem>> {
    read_json_array(path)
}

/// Parse the watch-history file
pub fn parse_watch_history(path: &Path) -> Result<Vec<WatchRecord>> {
    read_json_array(path)
}

/// Parse a catalog already held in memory
pub fn parse_catalog_str(content: &str) -> Result<Vec<MediaItem>> {
    parse_json_array(content, "catalog.json")
}

/// Parse a watch history already held in memory
pub fn parse_watch_history_str(content: &str) -> Result<Vec<WatchRecord>> {
    parse_json_array(content, "watch_history.json")
}
