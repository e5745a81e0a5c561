//! One-shot purge of the target thread before importing
//!
//! Iterates the thread's post collection in fixed-size batches, oldest first,
//! deleting every post. Markers are deliberately left in place: the next pass
//! finds them orphaned and reconciles them through the normal import path.

use crate::storage::{PostStore, StorageResult};
use std::sync::{Arc, Mutex};

/// Deletes every post in the target thread, returning how many were purged
///
/// Batches are always taken from the front of the collection, since each
/// deletion shifts the remainder forward.
pub fn purge_thread<S: PostStore>(
    store: &Arc<Mutex<S>>,
    thread_id: i64,
    batch_size: usize,
) -> StorageResult<usize> {
    let mut purged = 0;
    loop {
        let batch = store
            .lock()
            .unwrap()
            .thread_post_ids(thread_id, 0, batch_size)?;
        if batch.is_empty() {
            break;
        }
        for post_id in batch {
            store.lock().unwrap().purge_post(post_id)?;
            purged += 1;
        }
    }

    tracing::info!("Purged {} posts from thread {}", purged, thread_id);
    Ok(purged)
}
