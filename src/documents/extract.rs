//! Plain-text extraction from HTML pages

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};

/// Elements whose text is never visible
const HIDDEN: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe",
];

/// Elements that start a new line of text
const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "header", "footer", "blockquote", "pre", "table", "ul", "ol", "dt", "dd",
];

static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());

/// Page title, if the document has a non-empty `<title>`
pub fn title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Visible text of the document, one block per line
pub fn visible_text(document: &Html) -> String {
    let mut raw = String::new();

    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Element(element) if BLOCKS.contains(&element.name()) => raw.push('\n'),
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    matches!(ancestor.value(), Node::Element(e) if HIDDEN.contains(&e.name()))
                });
                if !hidden {
                    raw.push_str(text);
                }
            }
            _ => {}
        }
    }

    normalize(&raw)
}

/// Collapse inline whitespace and drop empty lines
pub fn normalize(text: &str) -> String {
    text.lines()
        .map(|line| INLINE_SPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `text` to at most `max_bytes`, on a char boundary
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
