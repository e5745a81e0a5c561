//! Pass scheduler: the continuous top-level import loop
//!
//! A pass sweeps pages 1..max-pages in order. Pages are assumed newest-first,
//! so a page that yields nothing new means everything beyond it is already
//! imported and the pass ends early, unless the operator forces a full scan
//! with ignore-duplicates. After each pass, successful or not, the scheduler
//! sleeps for the fixed delay and restarts at page 1. No error is fatal.

use crate::config::{Config, ImportConfig};
use crate::import::cleaner::purge_thread;
use crate::import::walker::PageWalker;
use crate::storage::{MarkerStore, PostStore};
use crate::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Outcome of one full pass over the thread's pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Pages walked before the pass ended
    pub pages_walked: u32,
    /// Posts newly added across the whole pass
    pub posts_added: usize,
}

/// Decides which page a pass continues with, if any
///
/// The pass moves to the next page while the page limit is not exhausted and
/// either a full scan is forced or the current page yielded something new.
pub fn next_page(page: u32, newly_added: usize, config: &ImportConfig) -> Option<u32> {
    if page < config.max_pages && (config.ignore_duplicates || newly_added > 0) {
        Some(page + 1)
    } else {
        None
    }
}

/// Drives the walker across passes, forever
pub struct Scheduler<S> {
    config: ImportConfig,
    purge_batch_size: usize,
    walker: PageWalker<S>,
    store: Arc<Mutex<S>>,
}

impl<S: MarkerStore + PostStore> Scheduler<S> {
    pub fn new(config: &Config, walker: PageWalker<S>, store: Arc<Mutex<S>>) -> Self {
        Self {
            config: config.import.clone(),
            purge_batch_size: config.storage.purge_batch_size,
            walker,
            store,
        }
    }

    /// Runs one pass over pages 1..max-pages, honoring early stop
    ///
    /// Any page-level failure aborts the pass immediately and propagates;
    /// pages already walked keep their imports.
    pub async fn run_pass(&self) -> Result<PassSummary> {
        let mut summary = PassSummary::default();
        let mut page = 1;
        loop {
            tracing::info!("Fetching page {}", page);
            let newly_added = self.walker.import_page(page).await?;
            summary.pages_walked += 1;
            summary.posts_added += newly_added;

            match next_page(page, newly_added, &self.config) {
                Some(next) => page = next,
                None => break,
            }
        }
        Ok(summary)
    }

    /// Runs the continuous import loop; returns only on process termination
    ///
    /// The optional purge runs exactly once, before the first pass. Every
    /// pass outcome, success or failure, resolves to sleep-then-restart with
    /// the same fixed delay.
    pub async fn run(&self) {
        if self.config.delete_posts_before_import {
            if let Err(e) = purge_thread(&self.store, self.config.thread_id, self.purge_batch_size)
            {
                tracing::error!("Failed to purge thread {}: {}", self.config.thread_id, e);
            }
        }

        let delay = Duration::from_secs(self.config.delay_seconds);
        loop {
            match self.run_pass().await {
                Ok(summary) => {
                    tracing::info!(
                        "Finished! {} pages walked, {} posts added",
                        summary.pages_walked,
                        summary.posts_added
                    );
                }
                Err(e) => {
                    tracing::error!("Failed: {}", e);
                }
            }
            tokio::time::sleep(delay).await;
        }
    }
}
