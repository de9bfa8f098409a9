//! Full-page document fetching
//!
//! The gateway asks a [`DocumentFetcher`] for the text behind result URLs
//! when raw content is requested. A page may come back as several chunks.

mod extract;
mod fetcher;
mod splitter;

pub use fetcher::HttpDocumentFetcher;
pub use splitter::split_text;

use async_trait::async_trait;
use std::collections::HashMap;

/// A chunk of page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Source URL
    pub url: String,
    /// Page title, empty if unknown
    pub title: String,
    /// Text content
    pub content: String,
}

impl Document {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content: content.into(),
        }
    }
}

/// Document fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} has unsupported content type {content_type}")]
    Unsupported { url: String, content_type: String },

    #[error("document fetch failed: {0}")]
    Other(String),
}

/// Fetches full content for a list of URLs
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Documents in return order; several may share a URL
    async fn fetch(&self, urls: &[String]) -> Result<Vec<Document>, FetchError>;
}

/// Concatenate the chunks of each URL in return order, blank-line separated
pub fn merge_by_url(documents: Vec<Document>) -> HashMap<String, String> {
    let mut merged: HashMap<String, String> = HashMap::new();
    for doc in documents {
        merged
            .entry(doc.url)
            .and_modify(|existing| {
                existing.push_str("\n\n");
                existing.push_str(&doc.content);
            })
            .or_insert(doc.content);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_by_url_keeps_order() {
        let docs = vec![
            Document::new("https://a.test", "a1"),
            Document::new("https://b.test", "b1"),
            Document::new("https://a.test", "a2"),
            Document::new("https://a.test", "a3"),
        ];
        let merged = merge_by_url(docs);
        assert_eq!(merged["https://a.test"], "a1\n\na2\n\na3");
        assert_eq!(merged["https://b.test"], "b1");
    }
}
