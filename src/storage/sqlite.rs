//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the [`MarkerStore`]
//! and [`PostStore`] traits.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{MarkerStore, PostStore, StorageError, StorageResult};
use crate::storage::{marker_key, ImportMarker, NewPost, PostRow};
use crate::ScrapeError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ScrapeError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ScrapeError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, ScrapeError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::InvalidTimestamp(raw.to_string()))
}

impl MarkerStore for SqliteStorage {
    fn get_marker(&self, source_id: i64) -> StorageResult<Option<ImportMarker>> {
        let mut stmt = self
            .conn
            .prepare("SELECT target_post_id FROM import_markers WHERE key = ?1")?;

        let target_post_id: Option<i64> = stmt
            .query_row(params![marker_key(source_id)], |row| row.get(0))
            .optional()?;

        Ok(target_post_id.map(|target_post_id| ImportMarker {
            source_id,
            target_post_id,
        }))
    }

    fn put_marker(&mut self, source_id: i64, target_post_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO import_markers (key, target_post_id) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET target_post_id = excluded.target_post_id",
            params![marker_key(source_id), target_post_id],
        )?;
        Ok(())
    }

    fn delete_marker(&mut self, source_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM import_markers WHERE key = ?1",
            params![marker_key(source_id)],
        )?;
        Ok(())
    }
}

impl PostStore for SqliteStorage {
    fn create_post(&mut self, post: &NewPost) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO posts (thread_id, uid, content, handle, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                post.thread_id,
                post.uid,
                post.content,
                post.handle,
                post.timestamp.to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_post(&self, post_id: i64) -> StorageResult<Option<PostRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, thread_id, uid, content, handle, timestamp, imported_from_source_id
             FROM posts WHERE id = ?1",
        )?;

        let row = stmt
            .query_row(params![post_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<i64>>(6)?,
                ))
            })
            .optional()?;

        match row {
            Some((id, thread_id, uid, content, handle, timestamp, imported_from_source_id)) => {
                Ok(Some(PostRow {
                    id,
                    thread_id,
                    uid,
                    content,
                    handle,
                    timestamp: parse_timestamp(&timestamp)?,
                    imported_from_source_id,
                }))
            }
            None => Ok(None),
        }
    }

    fn source_ref(&self, post_id: i64) -> StorageResult<Option<Option<i64>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT imported_from_source_id FROM posts WHERE id = ?1")?;

        let row: Option<Option<i64>> = stmt
            .query_row(params![post_id], |row| row.get(0))
            .optional()?;

        Ok(row)
    }

    fn set_source_ref(&mut self, post_id: i64, source_id: i64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE posts SET imported_from_source_id = ?1 WHERE id = ?2",
            params![source_id, post_id],
        )?;

        if updated == 0 {
            return Err(StorageError::PostNotFound(post_id));
        }
        Ok(())
    }

    fn purge_post(&mut self, post_id: i64) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM posts WHERE id = ?1", params![post_id])?;
        Ok(())
    }

    fn thread_post_ids(
        &self,
        thread_id: i64,
        offset: usize,
        limit: usize,
    ) -> StorageResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM posts WHERE thread_id = ?1 ORDER BY id ASC LIMIT ?2 OFFSET ?3",
        )?;

        let ids = stmt
            .query_map(params![thread_id, limit as i64, offset as i64], |row| {
                row.get(0)
            })?
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(ids)
    }

    fn count_posts_for_source(&self, source_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE imported_from_source_id = ?1",
            params![source_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
