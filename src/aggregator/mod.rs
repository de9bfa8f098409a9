//! Search aggregator module
//!
//! Defines the aggregator seam and the SearXNG implementation behind it.

mod searxng;
mod traits;

pub use searxng::SearxngClient;
pub use traits::*;
