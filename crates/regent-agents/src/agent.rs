use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use regent_models::config::{AgentConfig, ForwardFillConfig, RegentConfig, ValidationConfig};
use regent_models::AgentResult;
use regent_store::{InputStore, ResultStore, StoreError, MONTHLY_DATA_FILE};
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::forward_fill::ForwardFillResolver;
use crate::memory::MemoryManager;
use crate::parser;
use crate::prompts;
use crate::provider::ProviderClient;
use crate::router::ModelRouter;

/// The closed set of domain agents. Each kind supplies its own input
/// list, readiness signal, and prompt; everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Macro,
    Market,
    Narrative,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Macro, AgentKind::Market, AgentKind::Narrative];

    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Macro => "macro",
            AgentKind::Market => "market",
            AgentKind::Narrative => "narrative",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "macro" => Some(AgentKind::Macro),
            "market" => Some(AgentKind::Market),
            "narrative" => Some(AgentKind::Narrative),
            _ => None,
        }
    }

    /// The document that must carry real content for the agent to run at
    /// all; a data-free day is declined without spending a model call.
    pub fn signal_file(self) -> &'static str {
        match self {
            AgentKind::Macro => "fundamentals.txt",
            AgentKind::Market => "technicals.txt",
            AgentKind::Narrative => "news.txt",
        }
    }

    /// Forward-fill lookback bound. Fundamentals move slowly, so the
    /// macro agent may reach further back than the market-closure fills.
    pub fn fill_lookback(self, config: &ForwardFillConfig) -> u32 {
        match self {
            AgentKind::Macro => config.fundamentals_lookback_days,
            AgentKind::Market | AgentKind::Narrative => config.market_lookback_days,
        }
    }
}

/// One domain agent: loads the day's inputs, merges memory, obtains a
/// judgment through the router, validates and persists it.
pub struct DomainAgent {
    kind: AgentKind,
    config: AgentConfig,
    validation: ValidationConfig,
    router: ModelRouter,
    memory: MemoryManager,
    forward_fill: ForwardFillResolver,
    inputs: InputStore,
    store: Arc<ResultStore>,
}

impl DomainAgent {
    pub fn new(
        kind: AgentKind,
        config: &RegentConfig,
        store: Arc<ResultStore>,
        client: Arc<dyn ProviderClient>,
    ) -> Self {
        let agent_config = config
            .agents
            .get(kind.name())
            .cloned()
            .unwrap_or_default();
        let router = ModelRouter::new(
            agent_config.chain.clone(),
            agent_config.temperature,
            &config.router,
            client,
        );
        Self {
            kind,
            validation: config.validation.clone(),
            router,
            memory: MemoryManager::new(kind.name(), &config.memory, store.clone()),
            forward_fill: ForwardFillResolver::new(store.clone(), &config.forward_fill),
            inputs: InputStore::new(&config.store.data_dir),
            store,
            config: agent_config,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Run the full pipeline for one date. Every failure is caught here,
    /// logged as one classified line, and converted to None; this
    /// boundary never raises.
    pub async fn analyze(&mut self, date: NaiveDate) -> Option<AgentResult> {
        match self.run(date).await {
            Ok(result) => {
                info!(
                    agent = self.kind.name(),
                    %date,
                    regime = %result.analysis.regime,
                    model = %result.metadata.model,
                    "analysis complete"
                );
                Some(result)
            }
            Err(e @ (AgentError::MissingInputs(_) | AgentError::InsufficientSignal(_))) => {
                info!(agent = self.kind.name(), %date, reason = %e, "inputs absent, trying forward fill");
                self.try_forward_fill(date).await
            }
            Err(e) => {
                warn!(agent = self.kind.name(), %date, error = %e, "analysis failed");
                None
            }
        }
    }

    async fn try_forward_fill(&self, date: NaiveDate) -> Option<AgentResult> {
        let lookback = self.kind.fill_lookback(self.forward_fill.config());
        match self
            .forward_fill
            .fill(self.kind.name(), date, lookback)
            .await
        {
            Ok(Some(filled)) => Some(filled),
            Ok(None) => {
                warn!(
                    agent = self.kind.name(),
                    %date,
                    lookback,
                    "no prior result within forward-fill bound"
                );
                None
            }
            Err(e) => {
                warn!(agent = self.kind.name(), %date, error = %e, "forward fill failed");
                None
            }
        }
    }

    async fn run(&mut self, date: NaiveDate) -> Result<AgentResult, AgentError> {
        // 1. Today's documents. A missing date directory is a hard miss;
        //    individual missing files are sentinel text inside the bundle.
        let mut bundle = self
            .inputs
            .load_bundle(date, &self.config.files)
            .map_err(|e| match e {
                StoreError::DateRootMissing(_) => AgentError::MissingInputs(date),
                other => AgentError::Store(other),
            })?;

        // 2. Rolling monthly baseline, for agents that use it.
        if self.config.uses_monthly {
            if let Some(monthly) = self.inputs.load_monthly() {
                bundle.insert(MONTHLY_DATA_FILE, monthly);
            }
        }

        // 3. Readiness: decline data-free days before spending a call.
        let signal = self.kind.signal_file();
        if !bundle.is_usable(signal) {
            return Err(AgentError::InsufficientSignal(format!(
                "{signal} has no usable content"
            )));
        }

        // 4. Historical context. Null on first run; a memory build
        //    failure degrades to null rather than failing the date.
        let memory = if self.memory.is_first_run(date).await {
            info!(agent = self.kind.name(), %date, "first run, no historical memory");
            None
        } else {
            match self.memory.build_window(date).await {
                Ok(window) => {
                    debug!(agent = self.kind.name(), %date, "{}", window.summary());
                    Some(window)
                }
                Err(e) => {
                    warn!(agent = self.kind.name(), %date, error = %e, "memory build failed, continuing without context");
                    None
                }
            }
        };

        // 5. Prompt and model call.
        let prompt = prompts::build_prompt(self.kind, date, &bundle, memory.as_ref());
        debug!(agent = self.kind.name(), %date, prompt_chars = prompt.len(), "invoking router");
        let reply = self.router.invoke(&prompt).await?;

        // 6. Parse the untrusted reply.
        let value = parser::parse_result_value(&reply.text)?;

        // 7. Validate before trusting any field, then persist.
        validate_result_shape(&value, self.kind.name(), &self.validation)?;
        let mut result: AgentResult = serde_json::from_value(value)
            .map_err(|e| AgentError::Parse(format!("result shape: {e}")))?;

        // The store key and provenance are authoritative here, whatever
        // the model echoed back.
        result.metadata.date = date;
        result.metadata.model = reply.model;
        result.metadata.timestamp = Utc::now();

        self.store.save_result(&result).await?;
        Ok(result)
    }
}

/// Enforce the output invariants on the raw JSON value before any
/// field is trusted. Failure here is terminal for the (agent, date) call;
/// nothing is persisted.
pub fn validate_result_shape(
    value: &serde_json::Value,
    agent: &str,
    config: &ValidationConfig,
) -> Result<(), AgentError> {
    for key in ["metadata", "data_snapshot", "analysis"] {
        if value.get(key).is_none() {
            return Err(AgentError::Validation(format!("missing required field: {key}")));
        }
    }

    let reported = value["metadata"].get("agent").and_then(|v| v.as_str());
    if reported != Some(agent) {
        return Err(AgentError::Validation(format!(
            "agent mismatch: expected {agent}, got {}",
            reported.unwrap_or("<none>")
        )));
    }

    let analysis = &value["analysis"];

    if config.require_regime
        && analysis
            .get("regime")
            .and_then(|v| v.as_str())
            .map_or(true, str::is_empty)
    {
        return Err(AgentError::Validation("missing regime label".to_string()));
    }

    let drivers = analysis
        .get("key_drivers")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AgentError::Validation("missing key_drivers".to_string()))?;
    if drivers.len() < config.min_key_drivers {
        return Err(AgentError::Validation(format!(
            "too few key drivers: {} < {}",
            drivers.len(),
            config.min_key_drivers
        )));
    }
    if drivers.len() > config.max_key_drivers {
        return Err(AgentError::Validation(format!(
            "too many key drivers: {} > {}",
            drivers.len(),
            config.max_key_drivers
        )));
    }

    if config.require_confidence {
        let confidence = analysis
            .get("confidence")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| AgentError::Validation("missing confidence score".to_string()))?;
        if confidence < config.min_confidence || confidence > config.max_confidence {
            return Err(AgentError::Validation(format!(
                "confidence out of range: {confidence}"
            )));
        }
    }

    Ok(())
}
