use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identity and provenance of one persisted analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultMetadata {
    /// Name of the producing agent ("macro", "market", "narrative").
    pub agent: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    /// Resolved provider model that produced this result.
    pub model: String,
    /// Set only on forward-filled results: the date the analysis was copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_date: Option<NaiveDate>,
}

/// The structured judgment the model is asked to emit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    /// Discrete regime label (e.g. RISK_ON / RISK_OFF / NEUTRAL).
    #[serde(default)]
    pub regime: String,
    #[serde(default)]
    pub trend: String,
    #[serde(default)]
    pub key_drivers: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

/// Back-references into the agent's own memory window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryReferences {
    #[serde(default)]
    pub compared_to: Vec<String>,
    #[serde(default)]
    pub corrections: Vec<String>,
}

/// One agent's persisted output for one date. Keyed by (agent, date);
/// re-runs overwrite the whole document, never append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResult {
    pub metadata: ResultMetadata,
    /// Free-form evidence extracted for the date (key -> value).
    #[serde(default)]
    pub data_snapshot: serde_json::Map<String, serde_json::Value>,
    pub analysis: Analysis,
    #[serde(default)]
    pub memory_references: MemoryReferences,
}

impl AgentResult {
    /// First snapshot value in stable key order, rendered as plain text.
    /// Used by memory compression; None when the snapshot is empty.
    pub fn first_snapshot_value(&self) -> Option<String> {
        self.data_snapshot.values().next().map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Per-date combined artifact across all three domain agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub agents: RunAgents,
}

/// One slot per domain agent; null = that agent failed or was skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunAgents {
    pub r#macro: Option<AgentResult>,
    pub market: Option<AgentResult>,
    pub narrative: Option<AgentResult>,
}

impl RunAgents {
    pub fn set(&mut self, agent: &str, result: Option<AgentResult>) {
        match agent {
            "macro" => self.r#macro = result,
            "market" => self.market = result,
            "narrative" => self.narrative = result,
            _ => {}
        }
    }

    pub fn get(&self, agent: &str) -> Option<&AgentResult> {
        match agent {
            "macro" => self.r#macro.as_ref(),
            "market" => self.market.as_ref(),
            "narrative" => self.narrative.as_ref(),
            _ => None,
        }
    }

    pub fn success_count(&self) -> usize {
        [&self.r#macro, &self.market, &self.narrative]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.success_count() == 3
    }
}
