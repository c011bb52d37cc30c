//! LibraryIndex building and validation.
//!
//! Loads both collaborator exports, inserts them into a `LibraryIndex` and
//! checks the invariants the scoring pipeline depends on.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{info, warn};

/// File holding the catalog inside a data directory
pub const CATALOG_FILE: &str = "catalog.json";

/// File holding the watch history inside a data directory
pub const WATCH_HISTORY_FILE: &str = "watch_history.json";

impl LibraryIndex {
    /// Load the catalog and watch history from a directory.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Insert items (duplicate ids are rejected)
    /// 3. Insert watch records (duplicates collapse to the most recent play)
    /// 4. Validate
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading library from {:?}", data_dir);

        let catalog_path = data_dir.join(CATALOG_FILE);
        let history_path = data_dir.join(WATCH_HISTORY_FILE);

        let (items, records) = rayon::join(
            || parser::parse_catalog(&catalog_path),
            || parser::parse_watch_history(&history_path),
        );
        let items = items?;
        let records = records?;

        info!("Parsed {} items and {} watch records", items.len(), records.len());

        let index = Self::from_parts(items, records)?;
        let (items, users, records) = index.counts();
        info!(
            "Library ready: {} items, {} users, {} watch records",
            items, users, records
        );
        Ok(index)
    }

    /// Build an index from already decoded items and watch records
    pub fn from_parts(items: Vec<MediaItem>, records: Vec<WatchRecord>) -> Result<Self> {
        let mut index = LibraryIndex::new();
        for item in items {
            index.insert_item(item)?;
        }
        for record in records {
            index.insert_watch(record);
        }
        index.validate()?;
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Rejects watch records with a zero play count. Records pointing at
    /// items missing from the catalog are allowed (deleted items are
    /// routine) and only logged.
    pub fn validate(&self) -> Result<()> {
        let mut dangling = 0usize;
        for records in self.history.values() {
            for record in records.values() {
                if record.play_count == 0 {
                    return Err(CatalogError::InvalidValue {
                        field: "play_count".to_string(),
                        value: format!("0 (user {}, item {})", record.user_id, record.item_id),
                    });
                }
                if !self.positions.contains_key(&record.item_id) {
                    dangling += 1;
                }
            }
        }
        if dangling > 0 {
            warn!("{} watch records reference items missing from the catalog", dangling);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, item: &str, last_played: Timestamp) -> WatchRecord {
        WatchRecord {
            item_id: item.to_string(),
            user_id: user.to_string(),
            last_played,
            is_favorite: false,
            play_count: 1,
        }
    }

    #[test]
    fn test_from_parts_rejects_zero_play_count() {
        let mut bad = record("u1", "m1", 100);
        bad.play_count = 0;
        let result = LibraryIndex::from_parts(
            vec![MediaItem::new("m1", "Movie", MediaKind::Movie)],
            vec![bad],
        );
        assert!(matches!(result, Err(CatalogError::InvalidValue { .. })));
    }

    #[test]
    fn test_from_parts_rejects_duplicate_items() {
        let result = LibraryIndex::from_parts(
            vec![
                MediaItem::new("m1", "First", MediaKind::Movie),
                MediaItem::new("m1", "Second", MediaKind::Movie),
            ],
            Vec::new(),
        );
        assert!(matches!(result, Err(CatalogError::DuplicateItem { id }) if id == "m1"));
    }

    #[test]
    fn test_dangling_records_are_allowed() {
        let index = LibraryIndex::from_parts(
            vec![MediaItem::new("m1", "Movie", MediaKind::Movie)],
            vec![record("u1", "deleted", 100)],
        )
        .unwrap();
        assert_eq!(index.user_history("u1").len(), 1);
    }
}
