//! REGENT - temporal multi-agent market regime orchestrator.
//!
//! Ingests per-date text artifacts and produces structured, model-generated
//! regime assessments, chaining each day's output into the next day's
//! prompt through a compressed three-tier memory window.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use regent::models::RegentConfig;
//! use regent::agents::RunOptions;
//!
//! let config = RegentConfig::default();
//! let orchestrator = regent::build_orchestrator(&config, RunOptions::default());
//! ```

pub use regent_agents as agents;
pub use regent_models as models;
pub use regent_store as store;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use regent_agents::{
    AgentKind, DomainAgent, HttpProviderClient, Orchestrator, ProviderClient, RunOptions,
};
use regent_models::RegentConfig;
use regent_store::{InputStore, ResultStore};

/// Build an orchestrator with the production HTTP provider client.
/// A wholly missing data root is a hard error before any per-date work.
pub fn build_orchestrator(config: &RegentConfig, options: RunOptions) -> Result<Orchestrator> {
    if !Path::new(&config.store.data_dir).is_dir() {
        bail!("data root not found: {}", config.store.data_dir);
    }

    let client = Arc::new(HttpProviderClient::new(
        config.resolve_api_keys(),
        Duration::from_secs(config.router.request_timeout_seconds),
    ));
    Ok(build_orchestrator_with_client(config, options, client))
}

/// Build an orchestrator around any provider client. Used directly by
/// tests with scripted mocks.
pub fn build_orchestrator_with_client(
    config: &RegentConfig,
    options: RunOptions,
    client: Arc<dyn ProviderClient>,
) -> Orchestrator {
    let store = Arc::new(ResultStore::new(&config.store));
    let agents: Vec<DomainAgent> = AgentKind::ALL
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
