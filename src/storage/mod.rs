//! Storage module for the content store and the marker ledger
//!
//! This module handles all database operations for the importer, including:
//! - SQLite database initialization and schema management
//! - Target post creation, lookup, and purging
//! - The persisted idempotency ledger (import markers)

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{MarkerStore, PostStore, StorageError, StorageResult};

use crate::ScrapeError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Fixed prefix for persisted marker keys
pub const MARKER_KEY_PREFIX: &str = "_imported_post";

/// Composite key under which the marker for a source post is persisted
pub fn marker_key(source_id: i64) -> String {
    format!("{}:{}", MARKER_KEY_PREFIX, source_id)
}

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, ScrapeError> {
    SqliteStorage::new(path)
}

/// A target post to be created in the content store
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Thread the post is created in
    pub thread_id: i64,
    /// Authoring identity; imported posts use the anonymous uid 0
    pub uid: i64,
    /// Assembled markdown content
    pub content: String,
    /// Display handle carried over from the source post's author
    pub handle: String,
    /// Timestamp carried over from the source post
    pub timestamp: DateTime<Utc>,
}

/// Persisted idempotency record linking a source post id to a created target post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMarker {
    pub source_id: i64,
    pub target_post_id: i64,
}

/// A target post row as stored in the content store
#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub thread_id: i64,
    pub uid: i64,
    pub content: String,
    pub handle: String,
    pub timestamp: DateTime<Utc>,
    /// Back-reference to the source post this was imported from, once set
    pub imported_from_source_id: Option<i64>,
}
