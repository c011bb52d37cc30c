//! # Catalog Crate
//!
//! This crate holds the media library the recommender works on: the catalog
//! of movies and series and every user's watch history.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MediaItem, WatchRecord, LibraryIndex)
//! - **parser**: Decode the JSON exports of the catalog and history sources
//! - **index**: Build and validate a LibraryIndex
//! - **error**: Error types for library loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::LibraryIndex;
//! use std::path::Path;
//!
//! let library = LibraryIndex::load_from_dir(Path::new("data/sample"))?;
//!
//! let matrix = library.get_item("m-matrix").unwrap();
//! let history = library.user_history("alice");
//!
//! println!("alice watched {} items", history.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use index::{CATALOG_FILE, WATCH_HISTORY_FILE};
pub use types::{
    // Type aliases
    ItemId,
    UserId,
    Timestamp,
    // Core types
    MediaItem,
    MediaKind,
    WatchRecord,
    LibraryIndex,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn watch(user: &str, item: &str, last_played: Timestamp, play_count: u32) -> WatchRecord {
        WatchRecord {
            item_id: item.to_string(),
            user_id: user.to_string(),
            last_played,
            is_favorite: false,
            play_count,
        }
    }

    #[test]
    fn test_library_index_creation() {
        let index = LibraryIndex::new();
        let (items, users, records) = index.counts();

        assert_eq!(items, 0);
        assert_eq!(users, 0);
        assert_eq!(records, 0);
    }

    #[test]
    fn test_insert_item() {
        let mut index = LibraryIndex::new();

        let mut item = MediaItem::new("m1", "The Matrix", MediaKind::Movie);
        item.year = Some(1999);
        item.genres = vec!["Action".to_string(), "Science Fiction".to_string()];

        index.insert_item(item).unwrap();

        let retrieved = index.get_item("m1").unwrap();
        assert_eq!(retrieved.name, "The Matrix");
        assert_eq!(retrieved.year, Some(1999));
        assert_eq!(retrieved.genres.len(), 2);
        assert_eq!(index.items_of_kind(MediaKind::Movie), &["m1".to_string()]);
        assert!(index.items_of_kind(MediaKind::Series).is_empty());
    }

    #[test]
    fn test_items_keep_traversal_order() {
        let mut index = LibraryIndex::new();
        for id in ["c", "a", "b"] {
            index
                .insert_item(MediaItem::new(id, id.to_uppercase(), MediaKind::Series))
                .unwrap();
        }

        let ids: Vec<&str> = index.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_watch_keeps_most_recent() {
        let mut index = LibraryIndex::new();

        index.insert_watch(watch("u1", "m1", 1_000, 2));
        index.insert_watch(watch("u1", "m1", 5_000, 3));
        index.insert_watch(watch("u1", "m1", 2_000, 9));

        let history = index.user_history("u1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].last_played, 5_000);
        assert_eq!(history[0].play_count, 3);
    }

    #[test]
    fn test_user_history_sorted_by_item() {
        let mut index = LibraryIndex::new();
        index.insert_watch(watch("u1", "m3", 10, 1));
        index.insert_watch(watch("u1", "m1", 20, 1));
        index.insert_watch(watch("u2", "m2", 30, 1));

        let items: Vec<&str> = index
            .user_history("u1")
            .iter()
            .map(|r| r.item_id.as_str())
            .collect();
        assert_eq!(items, vec!["m1", "m3"]);

        let users: Vec<&UserId> = index.user_ids().collect();
        assert_eq!(users, vec!["u1", "u2"]);
        assert_eq!(index.counts(), (0, 2, 3));
    }

    #[test]
    fn test_empty_queries() {
        let index = LibraryIndex::new();

        assert!(index.get_item("missing").is_none());
        assert!(index.user_history("nobody").is_empty());
        assert!(index.items_of_kind(MediaKind::Movie).is_empty());
    }

    #[test]
    fn test_media_kind_parsing() {
        assert_eq!("Movie".parse::<MediaKind>(), Ok(MediaKind::Movie));
        assert_eq!("series".parse::<MediaKind>(), Ok(MediaKind::Series));
        assert!("podcast".parse::<MediaKind>().is_err());
        assert_eq!(MediaKind::Series.to_string(), "series");
    }
}
