//! Blogger JSON feeds (`?alt=json`).

use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{parse_published, FeedEntry, FeedPage, FeedParser};
use crate::error::{HarvesterError, Result};

/// Blogger's JSON feed: entries in `feed.entry`, the next page in the
/// `feed.link` whose `rel` is `next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BloggerJson;

#[derive(Debug, Deserialize)]
struct RawBlogger {
    feed: RawFeed,
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    #[serde(default)]
    entry: Vec<RawEntry>,
    #[serde(default)]
    link: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    published: Option<RawText>,
    #[serde(default)]
    content: Option<RawText>,
    #[serde(default)]
    link: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    #[serde(rename = "$t")]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    rel: String,
    href: String,
}

impl FeedParser for BloggerJson {
    fn parse_page(&self, body: &str, page_url: &Url) -> Result<FeedPage> {
        let raw: RawBlogger = serde_json::from_str(body)?;

        let next = raw
            .feed
            .link
            .iter()
            .find(|l| l.rel == "next")
            .map(|l| {
                page_url
                    .join(&l.href)
                    .map_err(|e| HarvesterError::InvalidFeed(format!("next link '{}': {e}", l.href)))
            })
            .transpose()?;

        let entries = raw
            .feed
            .entry
            .into_iter()
            .map(|entry| {
                let published = entry.published.and_then(|p| {
                    let parsed = parse_published(&p.text);
                    if parsed.is_none() {
                        debug!(published = %p.text, "Unparsable publication date in JSON feed");
                    }
                    parsed
                });
                let link = entry
                    .link
                    .iter()
                    .find(|l| l.rel == "alternate")
                    .and_then(|l| page_url.join(&l.href).ok());
                FeedEntry {
                    published,
                    content: entry.content.map(|c| c.text).unwrap_or_default(),
                    link,
                }
            })
            .collect();

        Ok(FeedPage { entries, next })
    }
}
