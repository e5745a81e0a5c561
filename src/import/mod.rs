//! Import module: the continuous scrape-and-import loop
//!
//! This module contains the core import logic, including:
//! - HTTP fetching of raw thread pages
//! - Post extraction from page markup
//! - Idempotent per-post import against the marker ledger
//! - Page walking and pass scheduling with fixed-delay retry

mod cleaner;
mod fetcher;
mod importer;
mod parser;
mod scheduler;
mod walker;

pub use cleaner::purge_thread;
pub use fetcher::{build_http_client, fetch_page, FetchError, PageContent};
pub use importer::{ImportError, Importer};
pub use parser::{parse_page, ParseError, PostRecord};
pub use scheduler::{next_page, PassSummary, Scheduler};
pub use walker::PageWalker;

use crate::config::Config;
use crate::storage::open_storage;
use crate::ScrapeError;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Runs the continuous import loop
///
/// This is the main entry point for the importer. It will:
/// 1. Open the storage database
/// 2. Build the HTTP client
/// 3. Purge the target thread, if configured
/// 4. Walk pages and import posts, forever, sleeping between passes
///
/// The loop only ends when the process is terminated externally, so this
/// returns only if initialization fails.
pub async fn run(config: Config) -> Result<(), ScrapeError> {
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let store = Arc::new(Mutex::new(storage));

    let client = build_http_client()?;
    let importer = Importer::new(Arc::clone(&store), config.import.thread_id);
    let walker = PageWalker::new(client, config.source.clone(), importer);
    let scheduler = Scheduler::new(&config, walker, store);

    scheduler.run().await;
    Ok(())
}
