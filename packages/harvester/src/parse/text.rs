//! Plain-text flattening of hypertext documents.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose content never contributes to document text.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that separate words when flattened.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// A parsed document together with its flattened text.
pub struct Document {
    html: Html,
    text: String,
}

impl Document {
    /// Parse hypertext (a full page or a fragment).
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        let text = flatten(html.root_element());
        Self { html, text }
    }

    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Visible text with whitespace collapsed to single spaces.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Flatten an element's visible text, collapsing whitespace.
///
/// Block elements and `<br>` act as word separators, so
/// `<p>Man City</p><p>vs</p>` reads "Man City vs".
#[must_use]
pub fn flatten(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push(' ');
                }
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
