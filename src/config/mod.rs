//! Configuration module for sharescrape
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every setting has a default, so running without a config file is
//! supported; CLI flags override whatever was loaded.
//!
//! # Example
//!
//! ```no_run
//! use sharescrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Target thread: {}", config.import.thread_id);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ImportConfig, SourceConfig, StorageConfig};

// Re-export parser functions
pub use parser::load_config;

// Re-export validation
pub use validation::validate;
