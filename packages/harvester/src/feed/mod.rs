//! Readers for link-following feeds.
//!
//! A feed page yields raw entries (one document each) plus the link to the
//! next, older page. Entries are extracted later by the
//! [`EntryParser`](crate::parse::EntryParser).

mod blogger_html;
mod blogger_json;
mod query;

use chrono::{DateTime, NaiveDateTime};
use url::Url;

use crate::error::Result;
use crate::kit::FeedKind;

pub use blogger_html::BloggerHtml;
pub use blogger_json::BloggerJson;
pub use query::SnapshotRequest;

/// One raw document from a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Publication time; `None` when the page did not state one.
    pub published: Option<NaiveDateTime>,

    /// Hypertext of the entry body.
    pub content: String,

    /// Permalink, when the page exposes one.
    pub link: Option<Url>,
}

/// Entries of one feed page and the link to the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub next: Option<Url>,
}

/// Parser for one feed format.
pub trait FeedParser: Send + Sync {
    /// Parse one fetched page.
    ///
    /// # Arguments
    /// * `body` - Raw response body
    /// * `page_url` - URL the body was fetched from, for resolving relative links
    fn parse_page(&self, body: &str, page_url: &Url) -> Result<FeedPage>;
}

/// The parser for a link-following feed kind; `None` for forum feeds.
#[must_use]
pub fn parser_for(kind: FeedKind) -> Option<&'static dyn FeedParser> {
    match kind {
        FeedKind::BloggerHtml => Some(&BloggerHtml),
        FeedKind::BloggerJson => Some(&BloggerJson),
        FeedKind::Forum => None,
    }
}

/// Parse a feed timestamp, with or without fractional seconds and offset.
///
/// Offsets are dropped in favour of the local time they were written in.
pub(crate) fn parse_published(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}
