//! Result type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// A single result as returned by the aggregator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    /// The title of the result
    pub title: String,
    /// The URL of the result
    pub url: String,
    /// Content snippet/description
    pub content: Option<String>,
    /// Published date, as reported by the engine
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    /// Aggregator relevance score
    pub score: Option<f64>,
    /// Image URL
    pub img_src: Option<String>,
}

impl SearchResult {
    /// Create a new result
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Add content to the result
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the aggregator score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the image URL
    pub fn with_image(mut self, img_src: impl Into<String>) -> Self {
        self.img_src = Some(img_src.into());
        self
    }

    /// Get the hostname from the URL; `None` if the URL does not parse
    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// A result in the gateway's response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedResult {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
}
