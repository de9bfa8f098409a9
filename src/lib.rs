//! Search Gateway: a Tavily-style search API in front of SearXNG
//!
//! Translates search requests into SearXNG queries, filters and reshapes the
//! results, and can enrich them with full page content and an LLM-written
//! answer.

pub mod aggregator;
pub mod config;
pub mod documents;
pub mod error;
pub mod llm;
pub mod network;
pub mod query;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use error::GatewayError;
pub use search::{Gateway, SearchRequest, SearchResponse};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
