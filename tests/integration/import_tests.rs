//! Integration tests for the import loop
//!
//! These tests use wiremock to serve share-chat pages and exercise the full
//! fetch -> parse -> import cycle end-to-end against real SQLite storage.

use sharescrape::config::Config;
use sharescrape::import::{build_http_client, purge_thread, Importer, PageWalker, Scheduler};
use sharescrape::storage::{
    ImportMarker, MarkerStore, NewPost, PostRow, PostStore, SqliteStorage, StorageError,
    StorageResult,
};
use sharescrape::ScrapeError;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders one share-chat post element
fn post_html(source_id: i64, subject: &str, author: &str, body: &str, date: &str) -> String {
    format!(
        r#"<div class="FullChatPost" id="chatPost_{source_id}">
            <div class="FullChatSubject">{subject}</div>
            <div class="FullChatInfo"><span>{author}</span><span>Posts: 33</span></div>
            <div class="FullChatText">{body}</div>
            <div class="FullChatDate">{date}</div>
        </div>"#
    )
}

/// Renders a full share-chat page around the given post elements
fn page_html(posts: &[String]) -> String {
    format!(
        "<html><head><title>Share Chat</title></head><body>{}</body></html>",
        posts.join("\n")
    )
}

/// Creates a test configuration pointed at a mock server
fn test_config(server_uri: &str, max_pages: u32, ignore_duplicates: bool) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}/ShareChat.asp", server_uri);
    config.import.max_pages = max_pages;
    config.import.ignore_duplicates = ignore_duplicates;
    config
}

/// Builds a scheduler over the given store for the given configuration
fn make_scheduler<S: MarkerStore + PostStore>(
    config: &Config,
    store: Arc<Mutex<S>>,
) -> Scheduler<S> {
    let client = build_http_client().expect("Failed to build HTTP client");
    let importer = Importer::new(Arc::clone(&store), config.import.thread_id);
    let walker = PageWalker::new(client, config.source.clone(), importer);
    Scheduler::new(config, walker, store)
}

/// Mounts a page response, optionally asserting how often it is fetched
async fn mount_page(server: &MockServer, page: u32, body: String, expected_hits: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/ShareChat.asp"))
        .and(query_param("page", page.to_string()))
        .and(query_param("ShareTicker", "IRR"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body));

    let mock = match expected_hits {
        Some(hits) => mock.expect(hits),
        None => mock,
    };
    mock.mount(server).await;
}

#[tokio::test]
async fn test_two_post_page_imports_once_across_passes() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[
            post_html(101, "First", "alice", "Hello <b>world</b>", "9 July 2018"),
            post_html(102, "Second", "bob", "More text", "9 July 2018"),
        ]),
        None,
    )
    .await;
    mount_page(&server, 2, page_html(&[]), None).await;

    let config = test_config(&server.uri(), 2, false);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    // First pass: both posts are new; the empty page 2 ends the pass.
    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.posts_added, 2);
    assert_eq!(summary.pages_walked, 2);

    // Second pass over the same content: nothing new, early stop on page 1.
    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.posts_added, 0);
    assert_eq!(summary.pages_walked, 1);

    let s = store.lock().unwrap();
    assert_eq!(s.count_posts_for_source(101).unwrap(), 1);
    assert_eq!(s.count_posts_for_source(102).unwrap(), 1);
}

#[tokio::test]
async fn test_imported_post_content_and_identity() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[post_html(
            77,
            "Great news",
            "alice",
            "Some <b>bold</b> text",
            "9 July 2018",
        )]),
        None,
    )
    .await;

    let config = test_config(&server.uri(), 1, false);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    scheduler.run_pass().await.unwrap();

    let s = store.lock().unwrap();
    let marker = s.get_marker(77).unwrap().unwrap();
    let post = s.get_post(marker.target_post_id).unwrap().unwrap();
    assert_eq!(post.thread_id, 14);
    assert_eq!(post.uid, 0);
    assert_eq!(post.handle, "alice");
    assert_eq!(post.imported_from_source_id, Some(77));
    assert!(post.content.starts_with("**Great news**\n\n"));
    assert!(post.content.contains("**bold**"));
}

#[tokio::test]
async fn test_early_stop_never_fetches_past_a_quiet_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[post_html(201, "One", "alice", "a", "9 July 2018")]),
        Some(1),
    )
    .await;
    mount_page(
        &server,
        2,
        page_html(&[post_html(202, "Two", "bob", "b", "9 July 2018")]),
        Some(1),
    )
    .await;
    mount_page(&server, 3, page_html(&[]), Some(1)).await;
    // Pages past the quiet one must never be fetched.
    mount_page(&server, 4, page_html(&[]), Some(0)).await;
    mount_page(&server, 5, page_html(&[]), Some(0)).await;

    let config = test_config(&server.uri(), 5, false);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, store);

    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.pages_walked, 3);
    assert_eq!(summary.posts_added, 2);

    // Dropping the server verifies the expected hit counts.
}

#[tokio::test]
async fn test_ignore_duplicates_forces_full_scan() {
    let server = MockServer::start().await;
    // Every page is fetched on both passes despite yielding nothing new
    // on the second one.
    mount_page(
        &server,
        1,
        page_html(&[
            post_html(101, "First", "alice", "a", "9 July 2018"),
            post_html(102, "Second", "bob", "b", "9 July 2018"),
        ]),
        Some(2),
    )
    .await;
    mount_page(&server, 2, page_html(&[]), Some(2)).await;
    mount_page(&server, 3, page_html(&[]), Some(2)).await;

    let config = test_config(&server.uri(), 3, true);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.pages_walked, 3);
    assert_eq!(summary.posts_added, 2);

    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.pages_walked, 3);
    assert_eq!(summary.posts_added, 0);
}

#[tokio::test]
async fn test_http_error_aborts_pass_but_keeps_earlier_imports() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[post_html(301, "Fine", "alice", "a", "9 July 2018")]),
        None,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/ShareChat.asp"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), 3, false);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    let result = scheduler.run_pass().await;
    assert!(matches!(result, Err(ScrapeError::Fetch(_))));

    // The page walked before the failure keeps its import.
    let s = store.lock().unwrap();
    assert_eq!(s.count_posts_for_source(301).unwrap(), 1);
}

#[tokio::test]
async fn test_malformed_post_aborts_the_page() {
    let server = MockServer::start().await;
    let broken = r#"<div class="FullChatPost" id="chatPost_402">
        <div class="FullChatSubject">No date on this one</div>
        <div class="FullChatInfo"><span>bob</span></div>
        <div class="FullChatText">Body</div>
    </div>"#
        .to_string();
    mount_page(
        &server,
        1,
        page_html(&[
            post_html(401, "Fine", "alice", "a", "9 July 2018"),
            broken,
        ]),
        None,
    )
    .await;

    let config = test_config(&server.uri(), 1, false);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    let result = scheduler.run_pass().await;
    assert!(matches!(result, Err(ScrapeError::Parse(_))));

    // Extraction aborted before any import, including the well-formed post.
    let s = store.lock().unwrap();
    assert_eq!(s.count_posts_for_source(401).unwrap(), 0);
}

#[tokio::test]
async fn test_externally_deleted_post_is_reimported() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[post_html(42, "Subject", "alice", "a", "9 July 2018")]),
        None,
    )
    .await;

    let config = test_config(&server.uri(), 1, false);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.posts_added, 1);

    // The target post vanishes behind the marker's back.
    let old_post_id = {
        let mut s = store.lock().unwrap();
        let ImportMarker { target_post_id, .. } = s.get_marker(42).unwrap().unwrap();
        s.purge_post(target_post_id).unwrap();
        target_post_id
    };

    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.posts_added, 1);

    let s = store.lock().unwrap();
    let marker = s.get_marker(42).unwrap().unwrap();
    assert_ne!(marker.target_post_id, old_post_id);
    assert_eq!(s.count_posts_for_source(42).unwrap(), 1);
}

#[tokio::test]
async fn test_purge_then_reimport() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[
            post_html(101, "First", "alice", "a", "9 July 2018"),
            post_html(102, "Second", "bob", "b", "9 July 2018"),
        ]),
        None,
    )
    .await;

    let config = test_config(&server.uri(), 1, false);
    let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    scheduler.run_pass().await.unwrap();

    let purged = purge_thread(&store, config.import.thread_id, 50).unwrap();
    assert_eq!(purged, 2);

    // Markers survived the purge as orphans; the next pass reconciles them
    // and imports everything again.
    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.posts_added, 2);

    let s = store.lock().unwrap();
    assert_eq!(s.count_posts_for_source(101).unwrap(), 1);
    assert_eq!(s.count_posts_for_source(102).unwrap(), 1);
}

/// Store wrapper that rejects creation of posts containing a poison string,
/// standing in for a flaky content store
struct FailingStore {
    inner: SqliteStorage,
    poison: &'static str,
}

impl MarkerStore for FailingStore {
    fn get_marker(&self, source_id: i64) -> StorageResult<Option<ImportMarker>> {
        self.inner.get_marker(source_id)
    }

    fn put_marker(&mut self, source_id: i64, target_post_id: i64) -> StorageResult<()> {
        self.inner.put_marker(source_id, target_post_id)
    }

    fn delete_marker(&mut self, source_id: i64) -> StorageResult<()> {
        self.inner.delete_marker(source_id)
    }
}

impl PostStore for FailingStore {
    fn create_post(&mut self, post: &NewPost) -> StorageResult<i64> {
        if post.content.contains(self.poison) {
            return Err(StorageError::Database("injected create failure".to_string()));
        }
        self.inner.create_post(post)
    }

    fn get_post(&self, post_id: i64) -> StorageResult<Option<PostRow>> {
        self.inner.get_post(post_id)
    }

    fn source_ref(&self, post_id: i64) -> StorageResult<Option<Option<i64>>> {
        self.inner.source_ref(post_id)
    }

    fn set_source_ref(&mut self, post_id: i64, source_id: i64) -> StorageResult<()> {
        self.inner.set_source_ref(post_id, source_id)
    }

    fn purge_post(&mut self, post_id: i64) -> StorageResult<()> {
        self.inner.purge_post(post_id)
    }

    fn thread_post_ids(
        &self,
        thread_id: i64,
        offset: usize,
        limit: usize,
    ) -> StorageResult<Vec<i64>> {
        self.inner.thread_post_ids(thread_id, offset, limit)
    }

    fn count_posts_for_source(&self, source_id: i64) -> StorageResult<u64> {
        self.inner.count_posts_for_source(source_id)
    }
}

#[tokio::test]
async fn test_one_failing_post_does_not_block_the_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[
            post_html(501, "Bad apple", "alice", "a", "9 July 2018"),
            post_html(502, "Good one", "bob", "b", "9 July 2018"),
        ]),
        None,
    )
    .await;

    let config = test_config(&server.uri(), 1, false);
    let store = Arc::new(Mutex::new(FailingStore {
        inner: SqliteStorage::new_in_memory().unwrap(),
        poison: "Bad apple",
    }));
    let scheduler = make_scheduler(&config, Arc::clone(&store));

    // The failing record is logged and counted as not-added; the rest of
    // the page imports normally.
    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.posts_added, 1);

    let s = store.lock().unwrap();
    assert_eq!(s.count_posts_for_source(501).unwrap(), 0);
    assert!(s.get_marker(501).unwrap().is_none());
    assert_eq!(s.count_posts_for_source(502).unwrap(), 1);
}

#[tokio::test]
async fn test_storage_survives_reopen() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        page_html(&[post_html(601, "Persistent", "alice", "a", "9 July 2018")]),
        None,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sharescrape.db");
    let config = test_config(&server.uri(), 1, false);

    {
        let store = Arc::new(Mutex::new(SqliteStorage::new(&db_path).unwrap()));
        let scheduler = make_scheduler(&config, store);
        let summary = scheduler.run_pass().await.unwrap();
        assert_eq!(summary.posts_added, 1);
    }

    // A fresh process sees the marker and adds nothing.
    let store = Arc::new(Mutex::new(SqliteStorage::new(&db_path).unwrap()));
    let scheduler = make_scheduler(&config, Arc::clone(&store));
    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.posts_added, 0);

    let s = store.lock().unwrap();
    assert_eq!(s.count_posts_for_source(601).unwrap(), 1);
}
