//! Search request and response models

use crate::config::{seconds, GatewaySettings, DEFAULT_GATEWAY_TIMEOUT};
use crate::error::GatewayError;
use crate::llm::GenerationConfig;
use crate::query::{TimeFilter, TimeRange};
use crate::results::ShapedResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// How much work to put into a search
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    /// Required for LLM answers
    Advanced,
}

impl FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown search_depth '{}'", other)),
        }
    }
}

/// Safe search level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum SafeSearch {
    Off,
    Moderate,
    Strict,
}

impl SafeSearch {
    /// Level as sent to the aggregator
    pub fn as_param(&self) -> String {
        u8::from(*self).to_string()
    }
}

impl TryFrom<u8> for SafeSearch {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Off),
            1 => Ok(Self::Moderate),
            2 => Ok(Self::Strict),
            other => Err(format!("safesearch must be 0, 1 or 2, got {}", other)),
        }
    }
}

impl From<SafeSearch> for u8 {
    fn from(level: SafeSearch) -> Self {
        match level {
            SafeSearch::Off => 0,
            SafeSearch::Moderate => 1,
            SafeSearch::Strict => 2,
        }
    }
}

/// Search request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub max_results: Option<usize>,
    pub search_depth: Option<SearchDepth>,

    pub include_answer: Option<bool>,
    pub include_raw_content: Option<bool>,
    pub include_images: Option<bool>,

    pub include_domains: Option<Vec<String>>,
    pub exclude_domains: Option<Vec<String>>,

    /// Start date, `YYYY-MM-DD`
    pub date_from: Option<String>,
    /// End date, `YYYY-MM-DD`
    pub date_to: Option<String>,
    /// Relative window in days
    pub days: Option<i64>,
    pub time_range: Option<TimeRange>,

    pub language: Option<String>,
    pub engines: Option<Vec<String>>,
    pub safesearch: Option<SafeSearch>,
    pub categories: Option<Vec<String>>,

    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub answer_max_tokens: Option<u32>,
    pub answer_temperature: Option<f64>,
    pub answer_context_size: Option<usize>,

    /// Raw content fetch timeout in seconds
    pub timeout: Option<f64>,
    pub api_key: Option<String>,
}

impl SearchRequest {
    /// Create a request for a query with everything else defaulted
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Whether a non-blank query was supplied
    pub fn has_query(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

    /// Apply defaults and limits, failing if the query is missing
    pub fn resolve(self, defaults: &GatewaySettings) -> Result<ResolvedRequest, GatewayError> {
        if !self.has_query() {
            return Err(GatewayError::MissingQuery);
        }
        let query = self.query.unwrap_or_default();

        let max_results = self
            .max_results
            .filter(|n| *n > 0)
            .unwrap_or(defaults.default_results)
            .min(defaults.max_results);

        let search_depth = self.search_depth.unwrap_or_else(|| {
            defaults
                .default_search_depth
                .parse()
                .unwrap_or_default()
        });

        let timeout_secs = self
            .timeout
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(defaults.timeout)
            .min(defaults.max_timeout);

        let safesearch = self.safesearch.unwrap_or_else(|| {
            SafeSearch::try_from(defaults.default_safesearch).unwrap_or(SafeSearch::Strict)
        });

        let llm = match (non_empty(self.llm_provider), non_empty(self.llm_model)) {
            (Some(provider), Some(model)) => Some(LlmSelection { provider, model }),
            _ => None,
        };

        Ok(ResolvedRequest {
            query,
            max_results,
            search_depth,
            include_answer: self.include_answer.unwrap_or(false),
            include_raw_content: self.include_raw_content.unwrap_or(false),
            include_images: self.include_images.unwrap_or(false),
            include_domains: self.include_domains.unwrap_or_default(),
            exclude_domains: self.exclude_domains.unwrap_or_default(),
            time_filter: TimeFilter {
                date_from: self.date_from,
                date_to: self.date_to,
                days: self.days,
                preset: self.time_range,
            },
            language: non_empty(self.language)
                .unwrap_or_else(|| defaults.default_language.clone()),
            engines: non_empty_list(self.engines)
                .unwrap_or_else(|| defaults.default_engines.clone()),
            safesearch,
            categories: non_empty_list(self.categories)
                .unwrap_or_else(|| defaults.default_categories.clone()),
            llm,
            answer_max_tokens: self.answer_max_tokens.filter(|n| *n > 0),
            generation: GenerationConfig::default().with_temperature(self.answer_temperature),
            answer_context_size: self
                .answer_context_size
                .filter(|n| *n > 0)
                .unwrap_or(defaults.answer_context_size),
            timeout: seconds(timeout_secs, DEFAULT_GATEWAY_TIMEOUT),
        })
    }
}

/// Provider and model explicitly chosen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSelection {
    pub provider: String,
    pub model: String,
}

/// A request with every default applied
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub query: String,
    /// Effective result limit, already clamped to the ceiling
    pub max_results: usize,
    pub search_depth: SearchDepth,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub time_filter: TimeFilter,
    pub language: String,
    pub engines: Vec<String>,
    pub safesearch: SafeSearch,
    pub categories: Vec<String>,
    pub llm: Option<LlmSelection>,
    pub answer_max_tokens: Option<u32>,
    pub generation: GenerationConfig,
    pub answer_context_size: usize,
    pub timeout: Duration,
}

/// Query-string form of [`SearchRequest`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub max_results: Option<String>,
    pub search_depth: Option<String>,
    pub include_answer: Option<String>,
    pub include_raw_content: Option<String>,
    pub include_images: Option<String>,
    /// Comma-separated
    pub include_domains: Option<String>,
    /// Comma-separated
    pub exclude_domains: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub days: Option<String>,
    pub time_range: Option<String>,
    pub language: Option<String>,
    /// Comma-separated
    pub engines: Option<String>,
    pub safesearch: Option<String>,
    /// Comma-separated
    pub categories: Option<String>,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub answer_max_tokens: Option<String>,
    pub answer_temperature: Option<String>,
    pub answer_context_size: Option<String>,
    pub timeout: Option<String>,
    pub api_key: Option<String>,
}

impl SearchParams {
    /// Build the equivalent request body.
    ///
    /// Unparsable numbers are treated as absent; unknown enum values are
    /// rejected.
    pub fn into_request(self) -> Result<SearchRequest, GatewayError> {
        let search_depth = non_empty(self.search_depth)
            .map(|v| v.parse::<SearchDepth>())
            .transpose()
            .map_err(GatewayError::Validation)?;

        let time_range = non_empty(self.time_range)
            .map(|v| v.parse::<TimeRange>())
            .transpose()
            .map_err(GatewayError::Validation)?;

        let safesearch = non_empty(self.safesearch)
            .map(|v| {
                v.trim()
                    .parse::<u8>()
                    .map_err(|_| format!("safesearch must be 0, 1 or 2, got '{}'", v))
                    .and_then(SafeSearch::try_from)
            })
            .transpose()
            .map_err(GatewayError::Validation)?;

        Ok(SearchRequest {
            query: self.query,
            max_results: parse_number(self.max_results),
            search_depth,
            include_answer: Some(is_true(self.include_answer)),
            include_raw_content: Some(is_true(self.include_raw_content)),
            include_images: Some(is_true(self.include_images)),
            include_domains: split_list(self.include_domains),
            exclude_domains: split_list(self.exclude_domains),
            date_from: non_empty(self.date_from),
            date_to: non_empty(self.date_to),
            days: parse_number(self.days),
            time_range,
            language: non_empty(self.language),
            engines: split_list(self.engines),
            safesearch,
            categories: split_list(self.categories),
            llm_provider: non_empty(self.llm_provider),
            llm_model: non_empty(self.llm_model),
            answer_max_tokens: parse_number(self.answer_max_tokens),
            answer_temperature: parse_number(self.answer_temperature),
            answer_context_size: parse_number(self.answer_context_size),
            timeout: parse_number(self.timeout),
            api_key: non_empty(self.api_key),
        })
    }
}

/// Metadata describing how the search was run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub time_range: String,
    pub language: String,
    pub engines_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_used: Option<String>,
}

/// Search response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_questions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    pub results: Vec<ShapedResult>,
    /// Elapsed seconds
    pub response_time: f64,
    pub metadata: ResponseMetadata,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty_list(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values
        .map(|list| {
            list.into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|list| !list.is_empty())
}

fn split_list(value: Option<String>) -> Option<Vec<String>> {
    non_empty_list(value.map(|v| v.split(',').map(str::to_string).collect()))
}

fn parse_number<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

fn is_true(value: Option<String>) -> bool {
    value.as_deref() == Some("true")
}
