//! Aggregator trait and types

use crate::query::TimeRange;
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;

/// Options passed with every aggregator search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatorOptions {
    /// Language code
    pub language: String,
    /// Engines to query
    pub engines: Vec<String>,
    /// Time range preset; `None` means unrestricted
    pub time_range: Option<TimeRange>,
    /// Safe search level, stringified (`"0"`, `"1"`, `"2"`)
    pub safesearch: String,
    /// Categories to search
    pub categories: Vec<String>,
}

/// Aggregator response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregatorResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

impl AggregatorResponse {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self { results }
    }
}

/// Errors from the aggregator; these fail the whole request
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("Search aggregator request failed: {0}")]
    Request(String),

    #[error("Search aggregator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode search aggregator response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A web-search aggregator
#[async_trait]
pub trait SearchAggregator: Send + Sync {
    /// Aggregator name, for logging
    fn name(&self) -> &str;

    /// Run a search; called at most once per gateway request
    async fn search(
        &self,
        query: &str,
        options: &AggregatorOptions,
    ) -> Result<AggregatorResponse, AggregatorError>;
}
