use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use regent_models::{RunAgents, RunResult};
use regent_store::{InputStore, ResultStore};
use tracing::{info, warn};

use crate::agent::DomainAgent;

/// Range-processing behavior toggles, set from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub skip_weekends: bool,
    pub skip_missing: bool,
}

/// Aggregate outcome of one date-range run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total_dates: usize,
    pub macro_successes: usize,
    pub market_successes: usize,
    pub narrative_successes: usize,
    /// Dates where not all three agents produced a result.
    pub incomplete_dates: Vec<NaiveDate>,
}

impl RunSummary {
    fn record(&mut self, run: &RunResult) {
        self.total_dates += 1;
        if run.agents.r#macro.is_some() {
            self.macro_successes += 1;
        }
        if run.agents.market.is_some() {
            self.market_successes += 1;
        }
        if run.agents.narrative.is_some() {
            self.narrative_successes += 1;
        }
        if !run.agents.all_succeeded() {
            self.incomplete_dates.push(run.date);
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total dates processed: {}", self.total_dates)?;
        writeln!(f)?;
        writeln!(f, "MACRO agent:     {}/{}", self.macro_successes, self.total_dates)?;
        writeln!(f, "MARKET agent:    {}/{}", self.market_successes, self.total_dates)?;
        writeln!(f, "NARRATIVE agent: {}/{}", self.narrative_successes, self.total_dates)?;
        writeln!(f)?;
        if self.incomplete_dates.is_empty() {
            write!(f, "All dates processed successfully.")
        } else {
            writeln!(f, "Dates with failures:")?;
            for date in &self.incomplete_dates {
                writeln!(f, "  - {date}")?;
            }
            Ok(())
        }
    }
}

/// Runs every domain agent for every date in a range, strictly
/// sequentially. One agent's failure never blocks the others for the
/// same date nor any subsequent date.
pub struct Orchestrator {
    agents: Vec<DomainAgent>,
    store: Arc<ResultStore>,
    inputs: InputStore,
    options: RunOptions,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("agents", &self.agents.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        agents: Vec<DomainAgent>,
        store: Arc<ResultStore>,
        inputs: InputStore,
        options: RunOptions,
    ) -> Self {
        Self {
            agents,
            store,
            inputs,
            options,
        }
    }

    /// Process `[start, end]` inclusive and return the aggregate summary.
    pub async fn run_range(&mut self, start: NaiveDate, end: NaiveDate) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut current = start;

        while current <= end {
            if self.options.skip_weekends && is_weekend(current) {
                info!(date = %current, "skipping weekend");
                current += Duration::days(1);
                continue;
            }
            if self.options.skip_missing && !self.inputs.date_root_exists(current) {
                info!(date = %current, "skipping date with no input folder");
                current += Duration::days(1);
                continue;
            }

            let run = self.process_date(current).await;
            summary.record(&run);
            current += Duration::days(1);
        }

        summary
    }

    /// Run all agents for one date and persist the combined artifact when
    /// at least one of them produced a result.
    pub async fn process_date(&mut self, date: NaiveDate) -> RunResult {
        info!(%date, "processing date");

        let mut agents = RunAgents::default();
        for agent in &mut self.agents {
            let name = agent.kind().name();
            let result = agent.analyze(date).await;
            agents.set(name, result);
        }

        let run = RunResult {
            date,
            timestamp: Utc::now(),
            agents,
        };

        let succeeded = run.agents.success_count();
        match succeeded {
            3 => info!(%date, "all agents completed"),
            0 => warn!(%date, "all agents failed"),
            n => warn!(%date, succeeded = n, "partial success"),
        }

        if succeeded > 0 {
            if let Err(e) = self.store.save_run_result(&run) {
                warn!(%date, error = %e, "failed to save combined result");
            }
        }

        run
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use crate::provider::ProviderClient;
    use crate::test_support::{sample_reply_json, MockProviderClient};
    use regent_models::config::{AgentConfig, ProviderConfig, RegentConfig};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Config rooted in a temp dir, with one distinctly named provider
    /// per agent so the mock client can answer each in character.
    fn test_config(dir: &tempfile::TempDir) -> RegentConfig {
        let mut config = RegentConfig::default();
        config.store.data_dir = dir.path().join("by_date").display().to_string();
        config.store.output_dir = dir.path().join("agent_outputs").display().to_string();
        config.store.structured_dir = dir.path().join("structured").display().to_string();

        for kind in AgentKind::ALL {
            let chain = vec![ProviderConfig {
                name: format!("{}-model", kind.name()),
                provider: "mock".to_string(),
                endpoint: "http://localhost/v1/chat/completions".to_string(),
                max_tokens: 2000,
                priority: 1,
            }];
            let agent_config = AgentConfig {
                chain,
                ..config.agents.get(kind.name()).unwrap().clone()
            };
            match kind {
                AgentKind::Macro => config.agents.r#macro = agent_config,
                AgentKind::Market => config.agents.market = agent_config,
                AgentKind::Narrative => config.agents.narrative = agent_config,
            }
        }
        config
    }

    fn seed_inputs(config: &RegentConfig, day: &str) {
        let root = std::path::Path::new(&config.store.data_dir).join(day);
        std::fs::create_dir_all(&root).unwrap();
        for (file, content) in [
            ("calendar.txt", "FOMC minutes 14:00"),
            ("fundamentals.txt", "T10Y: 4.35%, FEDFUNDS: 4.50%"),
            ("technicals.txt", "RSI 42, MACD bearish"),
            ("calculos.txt", "Hurst 0.44"),
            ("news.txt", "Fed holds rates steady"),
            ("forums.txt", "Retail cautious"),
        ] {
            std::fs::write(root.join(file), content).unwrap();
        }
    }

    fn scripted_client(day: &str) -> Arc<MockProviderClient> {
        Arc::new(
            MockProviderClient::succeeding("{}")
                .with_reply("macro-model", &sample_reply_json("macro", day, "NEUTRAL"))
                .with_reply("market-model", &sample_reply_json("market", day, "CONSOLIDATION"))
                .with_reply(
                    "narrative-model",
                    &sample_reply_json("narrative", day, "RISK_ON"),
                ),
        )
    }

    fn build_orchestrator(
        config: &RegentConfig,
        client: Arc<dyn ProviderClient>,
        options: RunOptions,
    ) -> Orchestrator {
        let store = Arc::new(ResultStore::new(&config.store));
        let agents = AgentKind::ALL
            .iter()
            .map(|kind| DomainAgent::new(*kind, config, store.clone(), client.clone()))
            .collect();
        Orchestrator::new(
            agents,
            store,
            InputStore::new(&config.store.data_dir),
            options,
        )
    }

    #[tokio::test]
    async fn all_agents_succeed_and_combined_artifact_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed_inputs(&config, "2026-01-20");

        let mut orchestrator =
            build_orchestrator(&config, scripted_client("2026-01-20"), RunOptions::default());
        let summary = orchestrator
            .run_range(date("2026-01-20"), date("2026-01-20"))
            .await;

        assert_eq!(summary.total_dates, 1);
        assert_eq!(summary.macro_successes, 1);
        assert_eq!(summary.market_successes, 1);
        assert_eq!(summary.narrative_successes, 1);
        assert!(summary.incomplete_dates.is_empty());

        let store = ResultStore::new(&config.store);
        let run = store.load_run_result(date("2026-01-20")).unwrap().unwrap();
        assert!(run.agents.all_succeeded());
        assert_eq!(run.agents.get("market").unwrap().analysis.regime, "CONSOLIDATION");
    }

    #[tokio::test]
    async fn one_failing_agent_does_not_block_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed_inputs(&config, "2026-01-20");

        let client = Arc::new(
            MockProviderClient::succeeding("{}")
                .with_reply("macro-model", &sample_reply_json("macro", "2026-01-20", "NEUTRAL"))
                .with_reply(
                    "narrative-model",
                    &sample_reply_json("narrative", "2026-01-20", "RISK_ON"),
                )
                .with_failure("market-model", "HTTP 429 Too Many Requests"),
        );

        let mut orchestrator = build_orchestrator(&config, client, RunOptions::default());
        let summary = orchestrator
            .run_range(date("2026-01-20"), date("2026-01-20"))
            .await;

        assert_eq!(summary.macro_successes, 1);
        assert_eq!(summary.market_successes, 0);
        assert_eq!(summary.narrative_successes, 1);
        assert_eq!(summary.incomplete_dates, vec![date("2026-01-20")]);

        // Combined artifact still persists with the failed slot null.
        let store = ResultStore::new(&config.store);
        let run = store.load_run_result(date("2026-01-20")).unwrap().unwrap();
        assert!(run.agents.market.is_none());
        assert!(run.agents.r#macro.is_some());
    }

    #[tokio::test]
    async fn weekends_are_skipped_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        // 2026-01-23 is a Friday; 24/25 the weekend; 26 the Monday.
        seed_inputs(&config, "2026-01-23");
        seed_inputs(&config, "2026-01-26");

        let client = Arc::new(
            MockProviderClient::succeeding("{}")
                .with_reply("macro-model", &sample_reply_json("macro", "2026-01-23", "NEUTRAL"))
                .with_reply("market-model", &sample_reply_json("market", "2026-01-23", "RISK_ON"))
                .with_reply(
                    "narrative-model",
                    &sample_reply_json("narrative", "2026-01-23", "RISK_ON"),
                ),
        );

        let options = RunOptions {
            skip_weekends: true,
            skip_missing: false,
        };
        let mut orchestrator = build_orchestrator(&config, client, options);
        let summary = orchestrator
            .run_range(date("2026-01-23"), date("2026-01-26"))
            .await;

        // Friday and Monday only.
        assert_eq!(summary.total_dates, 2);
    }

    #[tokio::test]
    async fn missing_input_roots_are_skipped_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        std::fs::create_dir_all(&config.store.data_dir).unwrap();
        seed_inputs(&config, "2026-01-21");

        let options = RunOptions {
            skip_weekends: false,
            skip_missing: true,
        };
        let mut orchestrator = build_orchestrator(&config, scripted_client("2026-01-21"), options);
        let summary = orchestrator
            .run_range(date("2026-01-20"), date("2026-01-21"))
            .await;

        // The 20th has no input folder and is skipped outright.
        assert_eq!(summary.total_dates, 1);
    }

    #[test]
    fn summary_rendering_lists_failed_dates() {
        let mut summary = RunSummary::default();
        summary.total_dates = 2;
        summary.macro_successes = 2;
        summary.market_successes = 1;
        summary.narrative_successes = 2;
        summary.incomplete_dates.push(date("2026-01-21"));

        let rendered = summary.to_string();
        assert!(rendered.contains("MACRO agent:     2/2"));
        assert!(rendered.contains("MARKET agent:    1/2"));
        assert!(rendered.contains("  - 2026-01-21"));
    }
}
