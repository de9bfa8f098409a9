//! Filtering and shaping of aggregator results

use super::types::{SearchResult, ShapedResult};
use std::collections::HashMap;

/// Score assigned to the first result when the aggregator provides none
const SYNTHETIC_TOP_SCORE: f64 = 1.0;
/// Decrease of the synthetic score per rank position
const SYNTHETIC_SCORE_STEP: f64 = 0.05;

/// Drop results whose host contains any excluded domain.
///
/// Results with an unparsable URL are kept.
pub fn exclude_domains(results: Vec<SearchResult>, excluded: &[String]) -> Vec<SearchResult> {
    let excluded: Vec<&str> = excluded
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .collect();
    if excluded.is_empty() {
        return results;
    }

    results
        .into_iter()
        .filter(|result| match result.hostname() {
            Some(host) => !excluded.iter().any(|domain| host.contains(domain)),
            None => true,
        })
        .collect()
}

/// Fallback relevance score for a 0-based rank
pub fn synthetic_score(rank: usize) -> f64 {
    SYNTHETIC_TOP_SCORE - rank as f64 * SYNTHETIC_SCORE_STEP
}

/// Convert aggregator results into response results.
///
/// `raw_content` maps URLs to their fetched page text; it is attached only
/// when `include_raw` is set and the text is non-empty.
pub fn shape(
    results: Vec<SearchResult>,
    raw_content: &HashMap<String, String>,
    include_raw: bool,
) -> Vec<ShapedResult> {
    results
        .into_iter()
        .enumerate()
        .map(|(rank, result)| {
            let score = result
                .score
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or_else(|| synthetic_score(rank));

            let raw = if include_raw {
                raw_content
                    .get(&result.url)
                    .filter(|content| !content.is_empty())
                    .cloned()
            } else {
                None
            };

            let content = result
                .content
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| result.title.clone());

            ShapedResult {
                title: result.title,
                url: result.url,
                content,
                raw_content: raw,
                score,
                published_date: result.published_date,
                img_src: result.img_src,
            }
        })
        .collect()
}

/// Collect up to `max` non-empty image URLs in result order
pub fn collect_images(results: &[ShapedResult], max: usize) -> Vec<String> {
    results
        .iter()
        .filter_map(|r| r.img_src.as_deref())
        .filter(|src| !src.trim().is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}
