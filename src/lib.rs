//! Sharescrape: a share-chat thread importer
//!
//! This crate implements a continuous scraper that walks a paginated forum
//! thread, extracts individual posts, and imports each post exactly once into
//! a local content store, deduplicated through a persisted marker ledger.

pub mod config;
pub mod import;
pub mod storage;

use thiserror::Error;

/// Main error type for sharescrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] import::FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] import::ParseError),

    #[error("Import error: {0}")]
    Import(#[from] import::ImportError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for sharescrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use import::{PageContent, PostRecord};
pub use storage::{ImportMarker, MarkerStore, NewPost, PostStore, SqliteStorage};
