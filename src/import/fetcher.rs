//! HTTP fetcher for raw thread pages
//!
//! This module retrieves the raw content of one thread page at a time. The
//! transport (http vs https) follows the configured URL scheme, the whole
//! response body is buffered before returning, and any status outside the
//! 2xx range is an error. There is no retry here: retrying a failed page is
//! the scheduler's job, after the fixed pass delay.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Raw content of one fetched thread page
///
/// Transient: created by the fetcher, consumed by the parser, then discarded.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number this content was fetched from
    pub page: u32,
    /// Raw response body
    pub body: String,
}

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to load {url}: status code {status}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

/// Builds the HTTP client used for all page fetches
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("sharescrape/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one thread page, buffering the full response body
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The fully parameterized page URL
/// * `page` - The page number the URL points at
///
/// # Returns
///
/// * `Ok(PageContent)` - The buffered page body
/// * `Err(FetchError)` - Non-2xx status or transport failure
pub async fn fetch_page(client: &Client, url: &Url, page: u32) -> Result<PageContent, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    Ok(PageContent { page, body })
}
