//! Idempotent per-post import
//!
//! The importer consumes one extracted post at a time. A persisted marker per
//! source id guarantees at-most-once import across repeated, unreliable runs:
//! a present marker whose target post completed the import short-circuits;
//! a marker whose target post is gone or never received its back-reference is
//! an orphan, silently reconciled by deleting the marker and re-importing.

use crate::import::parser::PostRecord;
use crate::storage::{MarkerStore, NewPost, PostStore, StorageError};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors raised while importing a single post
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("Markdown conversion failed for post {source_id}: {message}")]
    Markdown { source_id: i64, message: String },
}

/// Imports extracted posts into the content store, at most once each
pub struct Importer<S> {
    store: Arc<Mutex<S>>,
    thread_id: i64,
}

impl<S: MarkerStore + PostStore> Importer<S> {
    pub fn new(store: Arc<Mutex<S>>, thread_id: i64) -> Self {
        Self { store, thread_id }
    }

    /// Imports one post, returning whether it was newly added
    ///
    /// # Marker handling
    ///
    /// 1. No marker for the source id: create the post.
    /// 2. Marker present, target post back-references a real source id: the
    ///    import already completed, return `false`.
    /// 3. Marker present, target post missing or back-reference unset: the
    ///    marker is orphaned; delete it, log a warning, and create the post
    ///    as if no marker existed.
    ///
    /// On creation, the marker is written before the target post's
    /// back-reference. A crash between the two writes leaves the marker
    /// pointing at a real post and the next run re-enters reconciliation,
    /// which is safe to repeat; the narrow window is accepted rather than
    /// papered over with a transaction the content store may not offer.
    pub fn import_post(&self, record: &PostRecord) -> Result<bool, ImportError> {
        let mut store = self.store.lock().unwrap();

        if let Some(marker) = store.get_marker(record.source_id)? {
            match store.source_ref(marker.target_post_id)? {
                Some(Some(source_id)) if source_id > 0 => {
                    tracing::debug!(
                        "No need to add post {}, already exists as post {}",
                        record.source_id,
                        marker.target_post_id
                    );
                    return Ok(false);
                }
                Some(_) => {
                    tracing::warn!(
                        "Marker for post {} points at post {} without a back-reference, re-importing",
                        record.source_id,
                        marker.target_post_id
                    );
                    store.delete_marker(record.source_id)?;
                }
                None => {
                    tracing::warn!(
                        "Marker for post {} points at missing post {}, re-importing",
                        record.source_id,
                        marker.target_post_id
                    );
                    store.delete_marker(record.source_id)?;
                }
            }
        }

        let content = render_content(record)?;
        let target_post_id = store.create_post(&NewPost {
            thread_id: self.thread_id,
            uid: 0,
            content,
            handle: record.author.clone(),
            timestamp: record.timestamp,
        })?;

        // Marker first, back-reference second.
        store.put_marker(record.source_id, target_post_id)?;
        store.set_source_ref(target_post_id, record.source_id)?;

        tracing::debug!(
            "Imported post {} as post {}",
            record.source_id,
            target_post_id
        );
        Ok(true)
    }
}

/// Assembles the target post content: bold subject, blank line, markdown body
fn render_content(record: &PostRecord) -> Result<String, ImportError> {
    let body = htmd::convert(&record.body_html).map_err(|e| ImportError::Markdown {
        source_id: record.source_id,
        message: e.to_string(),
    })?;
    Ok(format!("**{}**\n\n{}", record.subject, body))
}
