//! Post extraction from raw thread pages
//!
//! Each post on a page is a `div.FullChatPost` element carrying its source id
//! in the `id` attribute (`chatPost_<n>`). Subject, body markup, author, and
//! a free-text date are pulled out of known child elements; the date text is
//! resolved against a reference instant with natural-language parsing.
//!
//! The date text often names only a weekday ("Monday 09:15"), which a naive
//! resolver places in the upcoming week. Any resolved timestamp after the
//! reference instant is therefore pulled back by exactly 7 days.
//!
//! A single malformed post element aborts extraction for the whole page.

use crate::import::fetcher::PageContent;
use chrono::{DateTime, Duration, Utc};
use chrono_english::{parse_date_string, Dialect};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Prefix of the id attribute carrying the source post id
const POST_ID_PREFIX: &str = "chatPost_";

/// One post extracted from a thread page, in document order
#[derive(Debug, Clone)]
pub struct PostRecord {
    /// Numeric id of the post in the source system
    pub source_id: i64,
    /// Post subject line
    pub subject: String,
    /// Post body as embedded markup, not converted to plain text
    pub body_html: String,
    /// Author display name
    pub author: String,
    /// Post timestamp, never after the instant it was resolved at
    pub timestamp: DateTime<Utc>,
}

/// Errors raised while extracting posts from a page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector '{0}'")]
    Selector(&'static str),

    #[error("Post element has malformed id attribute '{raw}'")]
    PostId { raw: String },

    #[error("Post {source_id} is missing required field '{field}'")]
    MissingField { source_id: i64, field: &'static str },

    #[error("Post {source_id} has unparseable date '{raw}'")]
    Date { source_id: i64, raw: String },
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

/// Extracts all posts from one page of raw content
///
/// # Arguments
///
/// * `content` - The raw page content to parse
/// * `reference` - Instant free-text dates are resolved against
///
/// # Returns
///
/// * `Ok(Vec<PostRecord>)` - All posts on the page, in document order
/// * `Err(ParseError)` - A post element was missing a required field; no
///   records from this page are returned
pub fn parse_page(
    content: &PageContent,
    reference: DateTime<Utc>,
) -> Result<Vec<PostRecord>, ParseError> {
    let document = Html::parse_document(&content.body);

    let post_selector = selector("div.FullChatPost[id]")?;
    let subject_selector = selector(".FullChatSubject")?;
    let body_selector = selector(".FullChatText")?;
    let info_selector = selector(".FullChatInfo")?;
    let date_selector = selector(".FullChatDate")?;

    let mut records = Vec::new();
    for element in document.select(&post_selector) {
        let source_id = extract_source_id(&element)?;

        let subject = element
            .select(&subject_selector)
            .next()
            .map(element_text)
            .ok_or(ParseError::MissingField {
                source_id,
                field: "subject",
            })?;

        let body_html = element
            .select(&body_selector)
            .next()
            .map(|e| e.inner_html())
            .ok_or(ParseError::MissingField {
                source_id,
                field: "body",
            })?;

        // Author is the first child element of the info block; the rest of
        // the block holds post counts and badges.
        let author = element
            .select(&info_selector)
            .next()
            .and_then(|info| info.children().filter_map(ElementRef::wrap).next())
            .map(|e| element_text(e))
            .filter(|text| !text.is_empty())
            .ok_or(ParseError::MissingField {
                source_id,
                field: "author",
            })?;

        let date_text = element
            .select(&date_selector)
            .next()
            .map(element_text)
            .ok_or(ParseError::MissingField {
                source_id,
                field: "date",
            })?;

        let resolved =
            parse_date_string(&date_text, reference, Dialect::Uk).map_err(|_| ParseError::Date {
                source_id,
                raw: date_text.clone(),
            })?;
        let timestamp = correct_future_date(resolved, reference);

        records.push(PostRecord {
            source_id,
            subject,
            body_html,
            author,
            timestamp,
        });
    }

    Ok(records)
}

/// Pulls the numeric source id out of a post element's id attribute
fn extract_source_id(element: &ElementRef) -> Result<i64, ParseError> {
    let raw = element.value().attr("id").unwrap_or_default();
    raw.strip_prefix(POST_ID_PREFIX)
        .and_then(|digits| digits.parse::<i64>().ok())
        .ok_or_else(|| ParseError::PostId {
            raw: raw.to_string(),
        })
}

/// Corrects timestamps that resolved into the future
///
/// Weekday-only date text is ambiguous; a naive parse lands in the upcoming
/// week instead of the prior one. Anything after the reference instant is
/// pulled back exactly 7 days, so the result never exceeds the reference.
pub fn correct_future_date(resolved: DateTime<Utc>, reference: DateTime<Utc>) -> DateTime<Utc> {
    if resolved > reference {
        resolved - Duration::days(7)
    } else {
        resolved
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
