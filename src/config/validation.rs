use crate::config::types::{Config, ImportConfig, SourceConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_import_config(&config.import)?;
    validate_source_config(&config.source)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates import loop configuration
fn validate_import_config(config: &ImportConfig) -> Result<(), ConfigError> {
    if config.delay_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "delay-seconds must be >= 1, got {}",
            config.delay_seconds
        )));
    }

    if config.thread_id < 1 {
        return Err(ConfigError::Validation(format!(
            "thread-id must be >= 1, got {}",
            config.thread_id
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates the source endpoint configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.ticker.is_empty() {
        return Err(ConfigError::Validation("ticker cannot be empty".to_string()));
    }

    if !config.ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "ticker must be alphanumeric, got '{}'",
            config.ticker
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.purge_batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "purge-batch-size must be >= 1, got {}",
            config.purge_batch_size
        )));
    }

    Ok(())
}
