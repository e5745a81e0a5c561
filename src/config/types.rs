use serde::Deserialize;

/// Main configuration structure for sharescrape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Import loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Seconds to sleep between passes
    #[serde(rename = "delay-seconds", default = "default_delay_seconds")]
    pub delay_seconds: u64,

    /// Identifier of the target thread posts are imported into
    #[serde(rename = "thread-id", default = "default_thread_id")]
    pub thread_id: i64,

    /// Maximum number of pages scanned per pass
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Disables early-stop-on-duplicate, forcing a full-range scan
    #[serde(rename = "ignore-duplicates", default)]
    pub ignore_duplicates: bool,

    /// Purge all previously imported posts for the thread once at startup
    #[serde(rename = "delete-posts-before-import", default)]
    pub delete_posts_before_import: bool,
}

/// Remote source endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Share-chat endpoint, parameterized by page number and ticker
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Fixed ShareTicker query parameter selecting the thread at the source
    #[serde(default = "default_ticker")]
    pub ticker: String,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Batch size used when purging the thread before import
    #[serde(rename = "purge-batch-size", default = "default_purge_batch_size")]
    pub purge_batch_size: usize,
}

fn default_delay_seconds() -> u64 {
    10
}

fn default_thread_id() -> i64 {
    14
}

fn default_max_pages() -> u32 {
    50
}

fn default_base_url() -> String {
    "http://www.lse.co.uk/ShareChat.asp".to_string()
}

fn default_ticker() -> String {
    "IRR".to_string()
}

fn default_database_path() -> String {
    "./sharescrape.db".to_string()
}

fn default_purge_batch_size() -> usize {
    50
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delay_seconds: default_delay_seconds(),
            thread_id: default_thread_id(),
            max_pages: default_max_pages(),
            ignore_duplicates: false,
            delete_posts_before_import: false,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ticker: default_ticker(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            purge_batch_size: default_purge_batch_size(),
        }
    }
}

impl SourceConfig {
    /// Builds the URL for one page of the thread
    pub fn page_url(&self, page: u32) -> Result<url::Url, url::ParseError> {
        url::Url::parse_with_params(
            &self.base_url,
            &[
                ("page", page.to_string()),
                ("ShareTicker", self.ticker.clone()),
            ],
        )
    }
}
