use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::result::Analysis;

/// Three-tier compressed view of an agent's own prior outputs, oldest first.
/// Derived on demand; never stored. Serialized verbatim into prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryWindow {
    pub long_context: LongContext,
    pub medium_context: MediumContext,
    pub recent_context: RecentContext,
}

impl MemoryWindow {
    /// One-line load report used in logs.
    pub fn summary(&self) -> String {
        format!(
            "memory loaded: {} long days, {} medium weeks, {} recent days",
            self.long_context.days.len(),
            self.medium_context.weeks.len(),
            self.recent_context.days.len()
        )
    }
}

/// Oldest slice: regime labels only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LongContext {
    pub description: String,
    pub span: String,
    pub days: Vec<RegimeDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegimeDay {
    pub date: NaiveDate,
    pub regime: String,
}

/// Middle slice: contiguous 7-day buckets, each reduced to a summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediumContext {
    pub description: String,
    pub span: String,
    pub weeks: Vec<WeekSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekSummary {
    /// "YYYY-MM-DD to YYYY-MM-DD".
    pub period: String,
    /// Dominant regime across the bucket; ties broken most-recent-wins.
    pub regime: String,
    /// First day's evidence joined to the last day's with an arrow.
    pub key_data: String,
    /// The most recent day's reasoning within the bucket.
    pub conclusion: String,
}

/// Newest slice: full detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentContext {
    pub description: String,
    pub span: String,
    pub days: Vec<RecentDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentDay {
    pub date: NaiveDate,
    pub data_snapshot: serde_json::Map<String, serde_json::Value>,
    pub analysis: Analysis,
}
