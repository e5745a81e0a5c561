//! Page walker: fetch, parse, and import one page of the thread
//!
//! Record-level import failures are contained here. A post that fails to
//! import is logged and counted as not-added; it must not block the rest of
//! the page. Fetch and parse failures abort the page and propagate to the
//! scheduler, which retries the whole pass after the fixed delay.

use crate::config::SourceConfig;
use crate::import::fetcher::fetch_page;
use crate::import::importer::Importer;
use crate::import::parser::parse_page;
use crate::storage::{MarkerStore, PostStore};
use crate::Result;
use chrono::Utc;
use reqwest::Client;

/// Walks one page at a time: Fetcher -> Parser -> Importer
pub struct PageWalker<S> {
    client: Client,
    source: SourceConfig,
    importer: Importer<S>,
}

impl<S: MarkerStore + PostStore> PageWalker<S> {
    pub fn new(client: Client, source: SourceConfig, importer: Importer<S>) -> Self {
        Self {
            client,
            source,
            importer,
        }
    }

    /// Fetches one page and imports every post on it, in document order
    ///
    /// # Returns
    ///
    /// The number of posts that were newly added. Already-imported posts and
    /// posts whose individual import failed both count as not-added.
    pub async fn import_page(&self, page: u32) -> Result<usize> {
        let url = self.source.page_url(page)?;
        let content = fetch_page(&self.client, &url, page).await?;
        let records = parse_page(&content, Utc::now())?;

        let mut newly_added = 0;
        for record in &records {
            match self.importer.import_post(record) {
                Ok(true) => newly_added += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Failed to import post {}: {}", record.source_id, e);
                }
            }
        }

        tracing::debug!(
            "Page {} yielded {} new posts out of {} extracted",
            page,
            newly_added,
            records.len()
        );
        Ok(newly_added)
    }
}
