//! Core domain types for the media library.
//!
//! This module defines the catalog entries, the watch events that join users
//! to them, and `LibraryIndex`, the in-memory store both are kept in.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a catalog item (library GUID or any stable string)
pub type ItemId = String;

/// Unique identifier for a user account
pub type UserId = String;

/// Seconds since the Unix epoch
pub type Timestamp = i64;

// =============================================================================
// Catalog Types
// =============================================================================

/// Kind of media a catalog item represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Movie, MediaKind::Series];
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaKind::Movie),
            "series" | "show" | "shows" => Ok(MediaKind::Series),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}

/// A movie or series in the catalog.
///
/// Items are created once per catalog scan and never mutated while a
/// recommendation run is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: ItemId,
    pub name: String,
    pub kind: MediaKind,
    #[serde(default)]
    pub year: Option<u16>,
    /// Community rating on a 0-10 scale
    #[serde(default)]
    pub community_rating: Option<f32>,
    /// Critic rating on a 0-100 scale
    #[serde(default)]
    pub critic_rating: Option<f32>,
    /// Provider name -> provider id (e.g. "Imdb" -> "tt0133093")
    #[serde(default)]
    pub external_ids: BTreeMap<String, String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Primary cast first
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MediaItem {
    /// Create an item with only the required fields set
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            year: None,
            community_rating: None,
            critic_rating: None,
            external_ids: BTreeMap::new(),
            path: None,
            genres: Vec::new(),
            actors: Vec::new(),
            directors: Vec::new(),
            tags: Vec::new(),
        }
    }
}

// =============================================================================
// Watch History
// =============================================================================

/// One user's aggregated viewing of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchRecord {
    pub item_id: ItemId,
    pub user_id: UserId,
    /// When the item was last played
    pub last_played: Timestamp,
    #[serde(default)]
    pub is_favorite: bool,
    /// Always >= 1 for a valid record
    #[serde(default = "default_play_count")]
    pub play_count: u32,
}

fn default_play_count() -> u32 {
    1
}

// =============================================================================
// LibraryIndex - The In-Memory Library
// =============================================================================

/// Holds the catalog and the watch history.
///
/// Items keep their traversal order (the order the catalog source produced
/// them in), which downstream vocabulary building relies on for tie-breaks.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    /// Catalog in traversal order
    pub(crate) items: Vec<MediaItem>,
    /// Position of each item in `items`
    pub(crate) positions: HashMap<ItemId, usize>,
    /// Item ids grouped by media kind, in traversal order
    pub(crate) kind_index: HashMap<MediaKind, Vec<ItemId>>,
    /// One record per (user, item); ordered so iteration is reproducible
    pub(crate) history: BTreeMap<UserId, BTreeMap<ItemId, WatchRecord>>,
}

impl LibraryIndex {
    /// Creates a new, empty LibraryIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an item by id
    pub fn get_item(&self, id: &str) -> Option<&MediaItem> {
        self.positions.get(id).map(|&pos| &self.items[pos])
    }

    /// Full catalog in traversal order
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// All item ids of one media kind
    pub fn items_of_kind(&self, kind: MediaKind) -> &[ItemId] {
        self.kind_index
            .get(&kind)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every user with at least one watch record, sorted by id
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.history.keys()
    }

    /// A user's watch records ordered by item id. Unknown users yield an empty list.
    pub fn user_history(&self, user_id: &str) -> Vec<&WatchRecord> {
        self.history
            .get(user_id)
            .map(|records| records.values().collect())
            .unwrap_or_default()
    }

    /// Add an item to the catalog.
    ///
    /// Fails when an item with the same id is already present.
    pub fn insert_item(&mut self, item: MediaItem) -> crate::Result<()> {
        if self.positions.contains_key(&item.id) {
            return Err(crate::CatalogError::DuplicateItem { id: item.id });
        }
        self.positions.insert(item.id.clone(), self.items.len());
        self.kind_index
            .entry(item.kind)
            .or_default()
            .push(item.id.clone());
        self.items.push(item);
        Ok(())
    }

    /// Record a watch observation.
    ///
    /// If the user already has a record for this item, the observation with
    /// the most recent `last_played` is kept.
    pub fn insert_watch(&mut self, record: WatchRecord) {
        let records = self.history.entry(record.user_id.clone()).or_default();
        match records.get(&record.item_id) {
            Some(existing) if existing.last_played >= record.last_played => {}
            _ => {
                records.insert(record.item_id.clone(), record);
            }
        }
    }

    /// Get counts (items, users, watch records) for logging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_records = self.history.values().map(|r| r.len()).sum();
        (self.items.len(), self.history.len(), total_records)
    }
}
