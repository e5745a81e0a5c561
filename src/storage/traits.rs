//! Storage traits and error types
//!
//! This module defines the trait seams between the import core and the
//! backing store. The importer only ever talks to a [`MarkerStore`] and a
//! [`PostStore`], so the core is decoupled from any specific storage
//! technology.

use crate::storage::{ImportMarker, NewPost, PostRow};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Post not found: {0}")]
    PostNotFound(i64),

    #[error("Invalid timestamp in database: {0}")]
    InvalidTimestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted idempotency ledger mapping source post ids to target post ids
///
/// One marker exists per imported source post, written on first successful
/// import and deleted when found orphaned.
pub trait MarkerStore {
    /// Looks up the marker for a source post id
    fn get_marker(&self, source_id: i64) -> StorageResult<Option<ImportMarker>>;

    /// Writes (or overwrites) the marker for a source post id
    fn put_marker(&mut self, source_id: i64, target_post_id: i64) -> StorageResult<()>;

    /// Deletes the marker for a source post id, if present
    fn delete_marker(&mut self, source_id: i64) -> StorageResult<()>;
}

/// Content store holding the created target posts
pub trait PostStore {
    /// Creates a target post, returning its id
    fn create_post(&mut self, post: &NewPost) -> StorageResult<i64>;

    /// Fetches a target post by id
    fn get_post(&self, post_id: i64) -> StorageResult<Option<PostRow>>;

    /// Reads the back-reference field of a target post
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - the post does not exist at all
    /// * `Ok(Some(None))` - the post exists but its back-reference is unset
    /// * `Ok(Some(Some(source_id)))` - the post exists and back-references `source_id`
    fn source_ref(&self, post_id: i64) -> StorageResult<Option<Option<i64>>>;

    /// Sets the back-reference field of a target post
    ///
    /// Fails with [`StorageError::PostNotFound`] if the post does not exist.
    fn set_source_ref(&mut self, post_id: i64, source_id: i64) -> StorageResult<()>;

    /// Deletes a target post
    fn purge_post(&mut self, post_id: i64) -> StorageResult<()>;

    /// Returns one fixed-size batch of a thread's post ids, oldest first
    fn thread_post_ids(
        &self,
        thread_id: i64,
        offset: usize,
        limit: usize,
    ) -> StorageResult<Vec<i64>>;

    /// Counts live posts back-referencing a source post id
    fn count_posts_for_source(&self, source_id: i64) -> StorageResult<u64>;
}
