//! Query text construction
//!
//! Time constraints are resolved by an ordered list of strategies; the first
//! one that applies wins:
//! - Absolute dates: `after:YYYY-MM-DD` / `before:YYYY-MM-DD` tokens
//! - Relative days: converted to an `after:` token
//! - Preset: `day`, `week`, `month`, `year` forwarded to SearXNG
//!
//! Domain restrictions are appended as a `site:` disjunction.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Time range preset understood by SearXNG
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeRange {
    /// Get the string representation for API calls
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "all" => Ok(Self::All),
            other => Err(format!("unknown time_range '{}'", other)),
        }
    }
}

/// Time window fields of a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeFilter {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub days: Option<i64>,
    pub preset: Option<TimeRange>,
}

/// The time constraint chosen for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeConstraint {
    /// Explicit dates, passed through verbatim
    Absolute {
        from: Option<String>,
        to: Option<String>,
    },
    /// Last N days, anchored at `since`
    Relative { days: i64, since: NaiveDate },
    /// SearXNG preset, never `All`
    Preset(TimeRange),
}

impl TimeConstraint {
    /// Tokens appended to the query text, each preceded by a space
    pub fn query_modifier(&self) -> String {
        match self {
            Self::Absolute { from, to } => {
                let mut modifier = String::new();
                if let Some(from) = from {
                    modifier.push_str(&format!(" after:{}", from));
                }
                if let Some(to) = to {
                    modifier.push_str(&format!(" before:{}", to));
                }
                modifier
            }
            Self::Relative { since, .. } => format!(" after:{}", since.format("%Y-%m-%d")),
            Self::Preset(_) => String::new(),
        }
    }

    /// Preset forwarded to the aggregator, if any
    pub fn aggregator_time_range(&self) -> Option<TimeRange> {
        match self {
            Self::Preset(range) => Some(*range),
            _ => None,
        }
    }

    /// Human-readable description reported in response metadata
    pub fn describe(&self) -> String {
        match self {
            Self::Absolute { from, to } => format!(
                "{} to {}",
                from.as_deref().unwrap_or("all"),
                to.as_deref().unwrap_or("now")
            ),
            Self::Relative { days, .. } => format!("last {} days", days),
            Self::Preset(range) => range.to_string(),
        }
    }
}

/// Describe an optional constraint; no constraint is `all`
pub fn describe(constraint: Option<&TimeConstraint>) -> String {
    constraint
        .map(TimeConstraint::describe)
        .unwrap_or_else(|| TimeRange::All.to_string())
}

/// One way of turning a [`TimeFilter`] into a constraint
pub trait TimeRangeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `None` when this strategy does not apply
    fn resolve(&self, filter: &TimeFilter, today: NaiveDate) -> Option<TimeConstraint>;
}

/// `date_from` / `date_to`
pub struct AbsoluteDates;

impl TimeRangeStrategy for AbsoluteDates {
    fn name(&self) -> &'static str {
        "absolute"
    }

    fn resolve(&self, filter: &TimeFilter, _today: NaiveDate) -> Option<TimeConstraint> {
        let from = non_empty(filter.date_from.as_deref());
        let to = non_empty(filter.date_to.as_deref());
        if from.is_none() && to.is_none() {
            return None;
        }
        Some(TimeConstraint::Absolute { from, to })
    }
}

/// Positive `days`
pub struct RelativeDays;

impl TimeRangeStrategy for RelativeDays {
    fn name(&self) -> &'static str {
        "relative"
    }

    fn resolve(&self, filter: &TimeFilter, today: NaiveDate) -> Option<TimeConstraint> {
        let days = filter.days.filter(|d| *d > 0)?;
        let delta = Duration::try_days(days)?;
        let since = today.checked_sub_signed(delta)?;
        Some(TimeConstraint::Relative { days, since })
    }
}

/// `time_range` other than `all`
pub struct PresetRange;

impl TimeRangeStrategy for PresetRange {
    fn name(&self) -> &'static str {
        "preset"
    }

    fn resolve(&self, filter: &TimeFilter, _today: NaiveDate) -> Option<TimeConstraint> {
        filter
            .preset
            .filter(|p| *p != TimeRange::All)
            .map(TimeConstraint::Preset)
    }
}

static STRATEGIES: [&dyn TimeRangeStrategy; 3] = [&AbsoluteDates, &RelativeDays, &PresetRange];

/// Strategies in priority order
pub fn strategies() -> &'static [&'static dyn TimeRangeStrategy] {
    &STRATEGIES
}

/// Run the strategies in order and return the first constraint
pub fn resolve_time_constraint(filter: &TimeFilter, today: NaiveDate) -> Option<TimeConstraint> {
    strategies().iter().find_map(|strategy| {
        let constraint = strategy.resolve(filter, today)?;
        tracing::debug!(strategy = strategy.name(), "time constraint resolved");
        Some(constraint)
    })
}

/// Build the query text sent to the aggregator
pub fn augment_query(
    query: &str,
    constraint: Option<&TimeConstraint>,
    include_domains: &[String],
) -> String {
    let mut text = query.to_string();

    if let Some(constraint) = constraint {
        text.push_str(&constraint.query_modifier());
    }

    let sites: Vec<String> = include_domains
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(|d| format!("site:{}", d))
        .collect();
    if !sites.is_empty() {
        text.push_str(&format!(" ({})", sites.join(" OR ")));
    }

    text
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
