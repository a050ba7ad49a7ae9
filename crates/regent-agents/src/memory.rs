use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use regent_models::config::MemoryConfig;
use regent_models::{
    AgentResult, LongContext, MediumContext, MemoryWindow, RecentContext, RecentDay, RegimeDay,
    WeekSummary,
};
use regent_store::{ResultStore, StoreError};

/// Builds the three-tier compressed view of one agent's own prior outputs.
///
/// Recent days keep full fidelity for trend detection; older days are
/// reduced to their net effect, so a prompt can reference 30 days of
/// context in roughly bucket-count + recent-day-count units.
pub struct MemoryManager {
    agent: String,
    config: MemoryConfig,
    store: Arc<ResultStore>,
}

impl MemoryManager {
    pub fn new(agent: &str, config: &MemoryConfig, store: Arc<ResultStore>) -> Self {
        Self {
            agent: agent.to_string(),
            config: config.clone(),
            store,
        }
    }

    /// True iff no result exists for the immediately preceding calendar
    /// day. Deliberately not a full history scan.
    pub async fn is_first_run(&self, date: NaiveDate) -> bool {
        let yesterday = date - Duration::days(1);
        !matches!(
            self.store.load_result(&self.agent, yesterday).await,
            Ok(Some(_))
        )
    }

    /// Build the memory window for `date`. All three ranges end just
    /// before `date`; days with no persisted result are skipped without
    /// padding or error.
    pub async fn build_window(&self, date: NaiveDate) -> Result<MemoryWindow, StoreError> {
        let recent_days = i64::from(self.config.recent_days);
        let medium_days = i64::from(self.config.medium_days);
        let long_days = i64::from(self.config.long_days);
        let total = i64::from(self.config.total_window);

        let recent_start = date - Duration::days(recent_days);
        let medium_start = date - Duration::days(recent_days + medium_days);
        let long_start = date - Duration::days(total);

        // Long tier: regime labels only.
        let mut long_entries = Vec::new();
        for (day, result) in self.load_days(long_start, medium_start).await? {
            if !result.analysis.regime.is_empty() {
                long_entries.push(RegimeDay {
                    date: day,
                    regime: result.analysis.regime,
                });
            }
        }

        // Medium tier: contiguous 7-day buckets; empty buckets are omitted.
        let mut weeks = Vec::new();
        let mut bucket_start = medium_start;
        while bucket_start < recent_start {
            let bucket_end = (bucket_start + Duration::days(7)).min(recent_start);
            let days = self.load_days(bucket_start, bucket_end).await?;
            if let Some(summary) = compress_bucket(bucket_start, bucket_end, &days) {
                weeks.push(summary);
            }
            bucket_start = bucket_end;
        }

        // Recent tier: full detail.
        let mut recent_entries = Vec::new();
        for (day, result) in self.load_days(recent_start, date).await? {
            recent_entries.push(RecentDay {
                date: day,
                data_snapshot: result.data_snapshot,
                analysis: result.analysis,
            });
        }

        Ok(MemoryWindow {
            long_context: LongContext {
                description: format!("Days 1-{long_days} (oldest, regime labels only)"),
                span: format!("{long_start} to {medium_start}"),
                days: long_entries,
            },
            medium_context: MediumContext {
                description: format!(
                    "Days {}-{} (middle period, weekly summaries)",
                    long_days + 1,
                    long_days + medium_days
                ),
                span: format!("{medium_start} to {recent_start}"),
                weeks,
            },
            recent_context: RecentContext {
                description: format!(
                    "Days {}-{total} (last {recent_days} days, full detail)",
                    long_days + medium_days + 1
                ),
                span: format!("{recent_start} to {date}"),
                days: recent_entries,
            },
        })
    }

    async fn load_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, AgentResult)>, StoreError> {
        let mut days = Vec::new();
        let mut current = start;
        while current < end {
            if let Some(result) = self.store.load_result(&self.agent, current).await? {
                days.push((current, result));
            }
            current += Duration::days(1);
        }
        Ok(days)
    }
}

/// Reduce one bucket of daily outputs to a weekly summary. Returns None
/// when no day in the bucket has a result.
fn compress_bucket(
    start: NaiveDate,
    end: NaiveDate,
    days: &[(NaiveDate, AgentResult)],
) -> Option<WeekSummary> {
    if days.is_empty() {
        return None;
    }

    // Dominant regime = mode across the bucket. Ties resolve to the
    // regime whose latest occurrence is nearest the target date
    // (most-recent-wins).
    let mut best: Option<(&str, usize, NaiveDate)> = None;
    for (day, result) in days {
        let label = result.analysis.regime.as_str();
        if label.is_empty() {
            continue;
        }
        let count = days
            .iter()
            .filter(|(_, r)| r.analysis.regime == label)
            .count();
        let replace = match best {
            None => true,
            Some((_, best_count, best_last)) => {
                count > best_count || (count == best_count && *day > best_last)
            }
        };
        if replace {
            best = Some((label, count, *day));
        }
    }
    let regime = best
        .map(|(label, _, _)| label.to_string())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    // Before/after evidence: first available value joined to the last.
    let values: Vec<String> = days
        .iter()
        .filter_map(|(_, r)| r.first_snapshot_value())
        .collect();
    let key_data = match values.as_slice() {
        [] => "No data available".to_string(),
        [only] => only.clone(),
        [first, .., last] => format!("{first} → {last}"),
    };

    let conclusion = days
        .iter()
        .rev()
        .find_map(|(_, r)| {
            let reasoning = r.analysis.reasoning.trim();
            (!reasoning.is_empty()).then(|| reasoning.to_string())
        })
        .unwrap_or_else(|| "No analysis available".to_string());

    Some(WeekSummary {
        period: format!("{start} to {end}"),
        regime,
        key_data,
        conclusion,
    })
}
