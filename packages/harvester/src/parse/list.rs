//! Forum listing pages: one Event per topic link.

use scraper::Html;
use tracing::debug;
use url::Url;

use super::entry::build_event;
use super::text::flatten;
use crate::error::Result;
use crate::kit::ListKit;
use crate::types::Event;

/// An Event announced on a listing page, with the page describing it in full.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub event: Event,
    pub link: Url,
}

/// Read the Events announced on a listing page.
///
/// Each anchor selected by the kit's `link_selector` is matched against the
/// list kit; anchors that do not match or whose `href` cannot be resolved
/// against `page_url` are skipped.
///
/// # Errors
/// Only configuration errors; malformed items never fail the page.
pub fn parse_list(html: &str, kit: &ListKit, page_url: &Url) -> Result<Vec<ListItem>> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for anchor in document.select(&kit.link_selector) {
        let text = flatten(anchor);
        let Some(record) = kit.event.kit().first(&text) else {
            debug!(text = %text, "List entry does not match the list pattern");
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            debug!(text = %text, "List entry has no link");
            continue;
        };
        let link = match page_url.join(href) {
            Ok(link) => link,
            Err(e) => {
                debug!(href, error = %e, "List entry link cannot be resolved");
                continue;
            }
        };

        items.push(ListItem {
            event: build_event(&record)?,
            link,
        });
    }

    Ok(items)
}
