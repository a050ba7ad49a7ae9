//! End-to-end scenarios over a real temp data tree with scripted
//! provider mocks: first-run analysis, idempotent re-runs, chain
//! exhaustion, and forward-filling a closed day.

use std::sync::Arc;

use chrono::NaiveDate;
use regent_agents::test_support::{sample_reply_json, MockProviderClient};
use regent_agents::{AgentKind, DomainAgent, MemoryManager, ProviderClient};
use regent_models::config::{AgentConfig, ProviderConfig, RegentConfig};
use regent_store::ResultStore;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn test_config(dir: &tempfile::TempDir) -> RegentConfig {
    let mut config = RegentConfig::default();
    config.store.data_dir = dir.path().join("by_date").display().to_string();
    config.store.output_dir = dir.path().join("agent_outputs").display().to_string();
    config.store.structured_dir = dir.path().join("structured").display().to_string();
    config.agents.r#macro = AgentConfig {
        chain: vec![ProviderConfig {
            name: "macro-model".to_string(),
            provider: "mock".to_string(),
            endpoint: "http://localhost/v1/chat/completions".to_string(),
            max_tokens: 2000,
            priority: 1,
        }],
        ..config.agents.r#macro.clone()
    };
    config
}

fn seed_macro_inputs(config: &RegentConfig, day: &str) {
    let root = std::path::Path::new(&config.store.data_dir).join(day);
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("calendar.txt"), "FOMC minutes 14:00").unwrap();
    std::fs::write(root.join("fundamentals.txt"), "T10Y: 4.35%, FEDFUNDS: 4.50%").unwrap();
}

fn macro_agent(
    config: &RegentConfig,
    store: Arc<ResultStore>,
    client: Arc<dyn ProviderClient>,
) -> DomainAgent {
    DomainAgent::new(AgentKind::Macro, config, store, client)
}

#[tokio::test]
async fn first_run_produces_and_persists_a_result() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    seed_macro_inputs(&config, "2026-01-20");

    let store = Arc::new(ResultStore::new(&config.store));
    let memory = MemoryManager::new("macro", &config.memory, store.clone());
    assert!(memory.is_first_run(date("2026-01-20")).await);

    let client = Arc::new(MockProviderClient::succeeding(&sample_reply_json(
        "macro",
        "2026-01-20",
        "NEUTRAL",
    )));
    let mut agent = macro_agent(&config, store.clone(), client.clone());

    let result = agent.analyze(date("2026-01-20")).await.unwrap();
    assert_eq!(result.metadata.agent, "macro");
    assert_eq!(result.metadata.date, date("2026-01-20"));
    // The resolved provider's name replaces the prompt placeholder.
    assert_eq!(result.metadata.model, "macro-model");
    assert_eq!(result.analysis.regime, "NEUTRAL");

    // The model was actually called (not short-circuited by readiness).
    assert_eq!(client.calls(), vec!["macro-model"]);

    // Persisted under the (agent, date) key.
    let persisted = store
        .load_result("macro", date("2026-01-20"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(persisted, result);
}

#[tokio::test]
async fn rerun_is_idempotent_up_to_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    seed_macro_inputs(&config, "2026-01-20");

    let store = Arc::new(ResultStore::new(&config.store));
    let client = Arc::new(MockProviderClient::succeeding(&sample_reply_json(
        "macro",
        "2026-01-20",
        "NEUTRAL",
    )));
    let mut agent = macro_agent(&config, store, client);

    let first = agent.analyze(date("2026-01-20")).await.unwrap();
    let second = agent.analyze(date("2026-01-20")).await.unwrap();

    assert_eq!(first.metadata.agent, second.metadata.agent);
    assert_eq!(first.metadata.date, second.metadata.date);
    assert_eq!(first.metadata.model, second.metadata.model);
    assert_eq!(first.data_snapshot, second.data_snapshot);
    assert_eq!(first.analysis, second.analysis);
    assert_eq!(first.memory_references, second.memory_references);
}

#[tokio::test]
async fn fenced_reply_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    seed_macro_inputs(&config, "2026-01-20");

    let fenced = format!(
        "```json\n{}\n```",
        sample_reply_json("macro", "2026-01-20", "RISK_OFF")
    );
    let store = Arc::new(ResultStore::new(&config.store));
    let client = Arc::new(MockProviderClient::succeeding(&fenced));
    let mut agent = macro_agent(&config, store, client);

    let result = agent.analyze(date("2026-01-20")).await.unwrap();
    assert_eq!(result.analysis.regime, "RISK_OFF");
}

#[tokio::test]
async fn exhausted_chain_yields_null_and_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    seed_macro_inputs(&config, "2026-01-20");

    let store = Arc::new(ResultStore::new(&config.store));
    let client = Arc::new(MockProviderClient::failing("operation timed out after 90s"));
    let mut agent = macro_agent(&config, store.clone(), client);

    assert!(agent.analyze(date("2026-01-20")).await.is_none());
    assert!(store
        .load_result("macro", date("2026-01-20"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn mismatched_identity_yields_null_and_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    seed_macro_inputs(&config, "2026-01-20");

    // The model claims to be the market agent.
    let store = Arc::new(ResultStore::new(&config.store));
    let client = Arc::new(MockProviderClient::succeeding(&sample_reply_json(
        "market",
        "2026-01-20",
        "NEUTRAL",
    )));
    let mut agent = macro_agent(&config, store.clone(), client);

    assert!(agent.analyze(date("2026-01-20")).await.is_none());
    assert!(store
        .load_result("macro", date("2026-01-20"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn closed_day_is_forward_filled_from_prior_result() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    // Friday has real inputs; the weekend directories do not exist.
    seed_macro_inputs(&config, "2026-01-23");

    let store = Arc::new(ResultStore::new(&config.store));
    let client = Arc::new(MockProviderClient::succeeding(&sample_reply_json(
        "macro",
        "2026-01-23",
        "NEUTRAL",
    )));
    let mut agent = macro_agent(&config, store.clone(), client.clone());

    agent.analyze(date("2026-01-23")).await.unwrap();

    let saturday = agent.analyze(date("2026-01-24")).await.unwrap();
    assert_eq!(saturday.metadata.date, date("2026-01-24"));
    assert_eq!(saturday.metadata.source_date, Some(date("2026-01-23")));
    assert_eq!(saturday.analysis.regime, "NEUTRAL");
    assert_eq!(
        saturday.data_snapshot["forward_filled"],
        serde_json::json!(true)
    );

    // Exactly one model call: the fill never invokes the router.
    assert_eq!(client.calls().len(), 1);

    // The filled result is persisted like any other.
    assert!(store
        .load_result("macro", date("2026-01-24"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn empty_signal_document_declines_without_a_model_call() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let root = std::path::Path::new(&config.store.data_dir).join("2026-01-20");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("calendar.txt"), "nothing scheduled").unwrap();
    std::fs::write(root.join("fundamentals.txt"), "  \n").unwrap();

    let store = Arc::new(ResultStore::new(&config.store));
    let client = Arc::new(MockProviderClient::succeeding(&sample_reply_json(
        "macro",
        "2026-01-20",
        "NEUTRAL",
    )));
    let mut agent = macro_agent(&config, store, client.clone());

    // No prior history to fill from either.
    assert!(agent.analyze(date("2026-01-20")).await.is_none());
    assert!(client.calls().is_empty());
}
