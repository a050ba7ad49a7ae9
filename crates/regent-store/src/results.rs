use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;
use regent_models::config::StoreConfig;
use regent_models::{AgentResult, RunResult};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Durable store for per-(agent, date) results and per-date combined
/// artifacts, fronted by a moka hot cache.
///
/// Reads check moka first, then disk; disk hits are promoted. Writes are
/// whole-file overwrites keyed by (agent, date) or (date); last writer
/// wins, which is safe under the orchestrator's sequential design.
pub struct ResultStore {
    output_dir: PathBuf,
    structured_dir: PathBuf,
    hot: Cache<String, Arc<AgentResult>>,
}

impl ResultStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            structured_dir: PathBuf::from(&config.structured_dir),
            hot: Cache::builder()
                .max_capacity(config.hot_cache_capacity)
                .time_to_live(Duration::from_secs(config.hot_cache_ttl_seconds))
                .build(),
        }
    }

    pub fn result_path(&self, agent: &str, date: NaiveDate) -> PathBuf {
        self.output_dir.join(agent).join(format!("{date}.json"))
    }

    pub fn run_result_path(&self, date: NaiveDate) -> PathBuf {
        self.structured_dir.join(format!("{date}.json"))
    }

    fn hot_key(agent: &str, date: NaiveDate) -> String {
        format!("{agent}/{date}")
    }

    /// Load one agent's result for one date. Absent days yield None; a
    /// corrupt document is logged and treated as absent rather than
    /// poisoning the memory window.
    pub async fn load_result(
        &self,
        agent: &str,
        date: NaiveDate,
    ) -> Result<Option<AgentResult>, StoreError> {
        let key = Self::hot_key(agent, date);
        if let Some(cached) = self.hot.get(&key).await {
            return Ok(Some(cached.as_ref().clone()));
        }

        let path = self.result_path(agent, date);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        match serde_json::from_str::<AgentResult>(&content) {
            Ok(result) => {
                self.hot.insert(key, Arc::new(result.clone())).await;
                Ok(Some(result))
            }
            Err(e) => {
                warn!(agent, %date, path = %path.display(), error = %e, "corrupt result document, skipping");
                Ok(None)
            }
        }
    }

    pub async fn result_exists(&self, agent: &str, date: NaiveDate) -> bool {
        self.hot.contains_key(&Self::hot_key(agent, date))
            || self.result_path(agent, date).is_file()
    }

    /// Persist one result, overwriting any prior document for the same
    /// (agent, date) key, and refresh the hot cache.
    pub async fn save_result(&self, result: &AgentResult) -> Result<PathBuf, StoreError> {
        let agent = &result.metadata.agent;
        let date = result.metadata.date;
        let path = self.result_path(agent, date);
        write_json(&path, result)?;
        self.hot
            .insert(Self::hot_key(agent, date), Arc::new(result.clone()))
            .await;
        debug!(agent, %date, path = %path.display(), "saved agent result");
        Ok(path)
    }

    /// Persist the per-date combined artifact.
    pub fn save_run_result(&self, run: &RunResult) -> Result<PathBuf, StoreError> {
        let path = self.run_result_path(run.date);
        write_json(&path, run)?;
        debug!(date = %run.date, path = %path.display(), "saved combined result");
        Ok(path)
    }

    pub fn load_run_result(&self, date: NaiveDate) -> Result<Option<RunResult>, StoreError> {
        let path = self.run_result_path(date);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
