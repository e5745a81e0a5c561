//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the sharescrape
//! database.

use rusqlite::Connection;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Target posts created by the importer
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    thread_id INTEGER NOT NULL,
    uid INTEGER NOT NULL,
    content TEXT NOT NULL,
    handle TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    imported_from_source_id INTEGER
);

CREATE INDEX IF NOT EXISTS idx_posts_thread ON posts(thread_id);
CREATE INDEX IF NOT EXISTS idx_posts_source ON posts(imported_from_source_id);

-- Idempotency ledger: one row per imported source post,
-- keyed by "_imported_post:<source_id>"
CREATE TABLE IF NOT EXISTS import_markers (
    key TEXT PRIMARY KEY,
    target_post_id INTEGER NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
