//! Blogger HTML pages.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{parse_published, FeedEntry, FeedPage, FeedParser};
use crate::error::{HarvesterError, Result};

#[allow(clippy::expect_used)] // Static selectors that are guaranteed to be valid
static POST_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.post-outer").expect("valid selector"));

#[allow(clippy::expect_used)]
static PUBLISHED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("abbr.published[title]").expect("valid selector"));

#[allow(clippy::expect_used)]
static CONTENT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.entry-content > div").expect("valid selector"));

#[allow(clippy::expect_used)]
static CONTENT_FALLBACK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.entry-content").expect("valid selector"));

#[allow(clippy::expect_used)]
static PERMALINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[itemprop="url"][content]"#).expect("valid selector"));

#[allow(clippy::expect_used)]
static NEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.blog-pager-older-link[href]").expect("valid selector"));

/// Blogger's rendered HTML: posts in `div.post-outer`, the older-posts link
/// in `a.blog-pager-older-link`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BloggerHtml;

impl FeedParser for BloggerHtml {
    fn parse_page(&self, body: &str, page_url: &Url) -> Result<FeedPage> {
        let html = Html::parse_document(body);

        let entries = html
            .select(&POST_SELECTOR)
            .map(|post| read_entry(post, page_url))
            .collect();

        let next = html
            .select(&NEXT_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| {
                page_url.join(href).map_err(|e| {
                    HarvesterError::InvalidFeed(format!("older-posts link '{href}': {e}"))
                })
            })
            .transpose()?;

        Ok(FeedPage { entries, next })
    }
}

fn read_entry(post: ElementRef<'_>, page_url: &Url) -> FeedEntry {
    let published = post
        .select(&PUBLISHED_SELECTOR)
        .next()
        .and_then(|abbr| abbr.value().attr("title"))
        .and_then(|title| {
            let parsed = parse_published(title);
            if parsed.is_none() {
                debug!(title, "Unparsable publication date on Blogger post");
            }
            parsed
        });

    let content = post
        .select(&CONTENT_SELECTOR)
        .next()
        .or_else(|| post.select(&CONTENT_FALLBACK_SELECTOR).next())
        .unwrap_or(post)
        .html();

    let link = post
        .select(&PERMALINK_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .and_then(|href| page_url.join(href).ok());

    FeedEntry {
        published,
        content,
        link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="post-outer">
            <meta itemprop="url" content="https://matchday.blogspot.com/2023/12/city-united.html">
            <abbr class="published" title="2023-12-01T20:30:00.000Z">Friday</abbr>
            <div class="entry-content"><div><p>Man City vs Man Utd</p></div></div>
          </div>
          <div class="post-outer">
            <div class="entry-content"><p>No date on this one</p></div>
          </div>
          <a class="blog-pager-older-link" href="/search?updated-max=2023-11-30T10:00:00Z">Older</a>
        </body></html>"#;

    fn page_url() -> Url {
        Url::parse("https://matchday.blogspot.com/").unwrap()
    }

    #[test]
    fn test_parse_entries() {
        let page = BloggerHtml.parse_page(PAGE, &page_url()).unwrap();
        assert_eq!(page.entries.len(), 2);

        let first = &page.entries[0];
        assert_eq!(first.published.unwrap().to_string(), "2023-12-01 20:30:00");
        assert!(first.content.starts_with("<div><p>Man City vs Man Utd"));
        assert_eq!(
            first.link.as_ref().unwrap().as_str(),
            "https://matchday.blogspot.com/2023/12/city-united.html"
        );

        let second = &page.entries[1];
        assert!(second.published.is_none());
        assert!(second.content.contains("No date on this one"));
    }

    #[test]
    fn test_next_link_resolved() {
        let page = BloggerHtml.parse_page(PAGE, &page_url()).unwrap();
        assert_eq!(
            page.next.unwrap().as_str(),
            "https://matchday.blogspot.com/search?updated-max=2023-11-30T10:00:00Z"
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = BloggerHtml
            .parse_page("<html><body></body></html>", &page_url())
            .unwrap();
        assert!(page.entries.is_empty());
        assert!(page.next.is_none());
    }
}
