//! Search orchestration module
//!
//! Validates requests, derives the time constraint, queries the aggregator,
//! then filters, enriches and reshapes results, optionally adding an LLM
//! answer.

mod answer;
mod gateway;
mod models;
#[cfg(test)]
pub(crate) mod testing;

pub use answer::{build_context, parse_follow_ups, Synthesis, MAX_FOLLOW_UPS};
pub use gateway::Gateway;
pub use models::*;
