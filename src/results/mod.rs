//! Result types and shaping
//!
//! Defines aggregator results, the shaped results returned to callers, and
//! the filtering/scoring applied in between.

mod shaping;
mod types;

pub use shaping::{collect_images, exclude_domains, shape, synthetic_score};
pub use types::*;
