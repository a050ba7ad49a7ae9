use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use regent_models::config::ForwardFillConfig;
use regent_models::AgentResult;
use regent_store::{ResultStore, StoreError};
use tracing::info;

/// Substitutes the most recent valid result when a date's source data is
/// structurally absent (markets closed, data outage). Downstream memory
/// windows must never contain silent gaps for non-trading days, but no
/// genuinely new analysis is fabricated either: the bound is hard.
pub struct ForwardFillResolver {
    store: Arc<ResultStore>,
    config: ForwardFillConfig,
}

impl ForwardFillResolver {
    pub fn new(store: Arc<ResultStore>, config: &ForwardFillConfig) -> Self {
        Self {
            store,
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &ForwardFillConfig {
        &self.config
    }

    /// Walk backward up to `lookback` days; the first prior date with a
    /// persisted result is copied onto `date` (analysis verbatim,
    /// metadata rewritten to record provenance) and persisted as a
    /// normal result. None when nothing usable exists within the bound.
    pub async fn fill(
        &self,
        agent: &str,
        date: NaiveDate,
        lookback: u32,
    ) -> Result<Option<AgentResult>, StoreError> {
        if !self.config.enabled {
            return Ok(None);
        }

        for offset in 1..=i64::from(lookback) {
            let prior = date - Duration::days(offset);
            let Some(source) = self.store.load_result(agent, prior).await? else {
                continue;
            };

            let mut filled = source;
            filled.metadata.date = date;
            filled.metadata.timestamp = Utc::now();
            filled.metadata.source_date = Some(prior);
            filled
                .data_snapshot
                .insert("forward_filled".to_string(), serde_json::json!(true));

            self.store.save_result(&filled).await?;
            info!(agent, %date, source = %prior, "forward-filled from prior result");
            return Ok(Some(filled));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regent_models::config::StoreConfig;
    use regent_models::{Analysis, MemoryReferences, ResultMetadata};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn test_store(dir: &tempfile::TempDir) -> Arc<ResultStore> {
        let config = StoreConfig {
            data_dir: dir.path().join("by_date").display().to_string(),
            output_dir: dir.path().join("agent_outputs").display().to_string(),
            structured_dir: dir.path().join("structured").display().to_string(),
            hot_cache_capacity: 64,
            hot_cache_ttl_seconds: 60,
        };
        Arc::new(ResultStore::new(&config))
    }

    fn make_result(day: NaiveDate, regime: &str) -> AgentResult {
        AgentResult {
            metadata: ResultMetadata {
                agent: "market".to_string(),
                date: day,
                timestamp: Utc::now(),
                model: "deepseek-r1-distill-llama-70b".to_string(),
                source_date: None,
            },
            data_snapshot: serde_json::Map::new(),
            analysis: Analysis {
                regime: regime.to_string(),
                trend: "RANGE_BOUND".to_string(),
                key_drivers: vec!["MOMENTUM".to_string()],
                reasoning: "Quiet close into the weekend.".to_string(),
                confidence: Some(0.6),
                risk_factors: vec!["Gap risk".to_string()],
            },
            memory_references: MemoryReferences::default(),
        }
    }

    fn resolver(store: Arc<ResultStore>) -> ForwardFillResolver {
        ForwardFillResolver::new(store, &ForwardFillConfig::default())
    }

    #[tokio::test]
    async fn nothing_within_bound_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let target = date("2026-01-26");

        // A result just outside the 3-day bound must not be used.
        store
            .save_result(&make_result(date("2026-01-22"), "CONSOLIDATION"))
            .await
            .unwrap();

        let filled = resolver(store).fill("market", target, 3).await.unwrap();
        assert!(filled.is_none());
    }

    #[tokio::test]
    async fn copies_nearest_prior_result_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let target = date("2026-01-26");
        let source_day = date("2026-01-24");

        let source = make_result(source_day, "CONSOLIDATION");
        store.save_result(&source).await.unwrap();

        let filled = resolver(store.clone())
            .fill("market", target, 3)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(filled.metadata.date, target);
        assert_eq!(filled.metadata.source_date, Some(source_day));
        assert_eq!(filled.analysis, source.analysis);
        assert_eq!(filled.data_snapshot["forward_filled"], serde_json::json!(true));

        // Persisted under the target date like any other result.
        let persisted = store.load_result("market", target).await.unwrap().unwrap();
        assert_eq!(persisted, filled);
    }

    #[tokio::test]
    async fn prefers_the_most_recent_prior_day() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let target = date("2026-01-26");

        store
            .save_result(&make_result(date("2026-01-23"), "BREAKDOWN"))
            .await
            .unwrap();
        store
            .save_result(&make_result(date("2026-01-25"), "BREAKOUT"))
            .await
            .unwrap();

        let filled = resolver(store)
            .fill("market", target, 3)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(filled.metadata.source_date, Some(date("2026-01-25")));
        assert_eq!(filled.analysis.regime, "BREAKOUT");
    }

    #[tokio::test]
    async fn disabled_resolver_never_fills() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store
            .save_result(&make_result(date("2026-01-25"), "BREAKOUT"))
            .await
            .unwrap();

        let config = ForwardFillConfig {
            enabled: false,
            ..ForwardFillConfig::default()
        };
        let resolver = ForwardFillResolver::new(store, &config);
        let filled = resolver.fill("market", date("2026-01-26"), 3).await.unwrap();
        assert!(filled.is_none());
    }
}
