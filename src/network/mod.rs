//! HTTP networking module
//!
//! Provides the outgoing HTTP client used for SearXNG, page fetches and LLM providers.

mod client;
mod request;
mod user_agent;

pub use client::HttpClient;
pub use request::{HttpMethod, HttpRequest, HttpResponse, RequestKind};
pub use user_agent::generate_user_agent;
