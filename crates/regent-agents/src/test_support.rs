//! Scripted provider mocks and fixture builders shared by unit and
//! integration tests. No network access anywhere.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use regent_models::ProviderConfig;

use crate::provider::{ProviderClient, ProviderFailure};

/// A provider client with canned replies and optional per-model failures.
/// Records the model name of every call in order, so tests can assert on
/// exactly which providers were tried.
pub struct MockProviderClient {
    default_reply: String,
    replies: BTreeMap<String, String>,
    fail_all: Option<String>,
    failures: BTreeMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockProviderClient {
    /// Every model answers with `reply` unless overridden.
    pub fn succeeding(reply: &str) -> Self {
        Self {
            default_reply: reply.to_string(),
            replies: BTreeMap::new(),
            fail_all: None,
            failures: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every model fails with the given diagnostic.
    pub fn failing(diagnostic: &str) -> Self {
        Self {
            default_reply: String::new(),
            replies: BTreeMap::new(),
            fail_all: Some(diagnostic.to_string()),
            failures: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Give one specific model its own reply.
    pub fn with_reply(mut self, model: &str, reply: &str) -> Self {
        self.replies.insert(model.to_string(), reply.to_string());
        self
    }

    /// Make one specific model fail with the given diagnostic.
    pub fn with_failure(mut self, model: &str, diagnostic: &str) -> Self {
        self.failures.insert(model.to_string(), diagnostic.to_string());
        self
    }

    /// Model names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    async fn complete(
        &self,
        provider: &ProviderConfig,
        _temperature: f64,
        _prompt: &str,
    ) -> Result<String, ProviderFailure> {
        self.calls.lock().unwrap().push(provider.name.clone());

        if let Some(diagnostic) = &self.fail_all {
            return Err(ProviderFailure::new(diagnostic.clone()));
        }
        if let Some(diagnostic) = self.failures.get(&provider.name) {
            return Err(ProviderFailure::new(diagnostic.clone()));
        }
        Ok(self
            .replies
            .get(&provider.name)
            .unwrap_or(&self.default_reply)
            .clone())
    }
}

/// A well-formed model reply for the given agent identity, as the literal
/// JSON text a provider would return.
pub fn sample_reply_json(agent: &str, date: &str, regime: &str) -> String {
    serde_json::json!({
        "metadata": {
            "agent": agent,
            "date": date,
            "timestamp": "2026-01-20T09:00:00Z",
            "model": "{{model}}"
        },
        "data_snapshot": {
            "rates": "T10Y 4.35%, FEDFUNDS 4.50%",
            "inflation": "CPI YoY 2.9%"
        },
        "analysis": {
            "regime": regime,
            "trend": "RANGE_BOUND",
            "key_drivers": ["REAL_RATES", "DXY"],
            "reasoning": "Real rates steady, dollar flat.",
            "confidence": 0.85,
            "risk_factors": ["CPI surprise"]
        },
        "memory_references": {
            "compared_to": [],
            "corrections": []
        }
    })
    .to_string()
}
