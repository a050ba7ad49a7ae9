use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level configuration for REGENT. Constructed once at process start
/// and passed by reference into each component's constructor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegentConfig {
    pub store: StoreConfig,
    pub router: RouterConfig,
    pub memory: MemoryConfig,
    pub validation: ValidationConfig,
    pub forward_fill: ForwardFillConfig,
    pub agents: AgentsConfig,
    /// Provider name -> credential lookup. Keys are resolved from the
    /// environment at runtime, never written into config files.
    pub providers: BTreeMap<String, ProviderCredential>,
}

/// On-disk layout for inputs and outputs, plus hot-cache sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Root containing one `YYYY-MM-DD` directory of text documents per date.
    pub data_dir: String,
    /// Root for per-(agent, date) result documents, one subtree per agent.
    pub output_dir: String,
    /// Root for per-date combined `RunResult` documents.
    pub structured_dir: String,
    /// Maximum entries in the in-memory hot cache over result files.
    pub hot_cache_capacity: u64,
    /// TTL in seconds for hot cache entries.
    pub hot_cache_ttl_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/by_date".to_string(),
            output_dir: "data/agent_outputs".to_string(),
            structured_dir: "data/structured".to_string(),
            hot_cache_capacity: 1024,
            hot_cache_ttl_seconds: 300,
        }
    }
}

/// Sticky-provider policy and per-call limits for the model router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// When false the router starts every call from provider 0.
    pub sticky_enabled: bool,
    /// Consecutive sticky successes before the primary provider is re-probed.
    pub retry_primary_after: u32,
    /// Per-provider-call timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            sticky_enabled: true,
            retry_primary_after: 5,
            request_timeout_seconds: 90,
        }
    }
}

/// Day counts for the three memory tiers, measured backward from the
/// target date, exclusive of the target date itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Last N days kept at full detail.
    pub recent_days: u32,
    /// Middle N days compressed into weekly summaries.
    pub medium_days: u32,
    /// Oldest N days reduced to regime labels.
    pub long_days: u32,
    /// Total memory span.
    pub total_window: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recent_days: 7,
            medium_days: 14,
            long_days: 9,
            total_window: 30,
        }
    }
}

/// Invariants enforced on every model-emitted result before persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    pub require_regime: bool,
    pub require_confidence: bool,
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub min_key_drivers: usize,
    pub max_key_drivers: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_regime: true,
            require_confidence: false,
            min_confidence: 0.0,
            max_confidence: 1.0,
            min_key_drivers: 1,
            max_key_drivers: 10,
        }
    }
}

/// Bounds for substituting the most recent valid result when a date's
/// source data is structurally absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForwardFillConfig {
    pub enabled: bool,
    /// Lookback for market-closure fills (market, narrative agents).
    pub market_lookback_days: u32,
    /// Lookback for slow-moving fundamentals fills (macro agent).
    pub fundamentals_lookback_days: u32,
}

impl Default for ForwardFillConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            market_lookback_days: 3,
            fundamentals_lookback_days: 8,
        }
    }
}

/// Per-domain agent configurations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentsConfig {
    pub r#macro: AgentConfig,
    pub market: AgentConfig,
    pub narrative: AgentConfig,
}

impl AgentsConfig {
    pub fn get(&self, agent: &str) -> Option<&AgentConfig> {
        match agent {
            "macro" => Some(&self.r#macro),
            "market" => Some(&self.market),
            "narrative" => Some(&self.narrative),
            _ => None,
        }
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            r#macro: AgentConfig {
                files: vec!["calendar.txt".to_string(), "fundamentals.txt".to_string()],
                uses_monthly: true,
                temperature: 0.2,
                chain: vec![
                    ProviderConfig::new("llama3.3-70b", "cerebras", CEREBRAS_ENDPOINT, 2000, 1),
                    ProviderConfig::new(
                        "Meta-Llama-3.3-70B-Instruct",
                        "sambanova",
                        SAMBANOVA_ENDPOINT,
                        2000,
                        2,
                    ),
                    ProviderConfig::new("llama-3.3-70b-versatile", "groq", GROQ_ENDPOINT, 2000, 3),
                ],
            },
            market: AgentConfig {
                files: vec!["technicals.txt".to_string(), "calculos.txt".to_string()],
                uses_monthly: false,
                temperature: 0.3,
                chain: vec![
                    ProviderConfig::new(
                        "deepseek-r1-distill-llama-70b",
                        "cerebras",
                        CEREBRAS_ENDPOINT,
                        2000,
                        1,
                    ),
                    ProviderConfig::new(
                        "DeepSeek-V3-0324",
                        "sambanova",
                        SAMBANOVA_ENDPOINT,
                        2000,
                        2,
                    ),
                    ProviderConfig::new("llama-3.3-70b-versatile", "groq", GROQ_ENDPOINT, 2000, 3),
                ],
            },
            narrative: AgentConfig {
                files: vec!["news.txt".to_string(), "forums.txt".to_string()],
                uses_monthly: false,
                temperature: 0.4,
                chain: vec![
                    ProviderConfig::new(
                        "Meta-Llama-3.3-70B-Instruct",
                        "sambanova",
                        SAMBANOVA_ENDPOINT,
                        2000,
                        1,
                    ),
                    ProviderConfig::new("llama3.3-70b", "cerebras", CEREBRAS_ENDPOINT, 2000, 2),
                    ProviderConfig::new("llama-3.3-70b-versatile", "groq", GROQ_ENDPOINT, 2000, 3),
                ],
            },
        }
    }
}

const CEREBRAS_ENDPOINT: &str = "https://api.cerebras.ai/v1/chat/completions";
const SAMBANOVA_ENDPOINT: &str = "https://api.sambanova.ai/v1/chat/completions";
const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// One domain agent: which documents it reads and which providers it may call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Daily documents loaded for this agent, in prompt order.
    pub files: Vec<String>,
    /// Whether the rolling monthly reference document is merged in.
    pub uses_monthly: bool,
    pub temperature: f64,
    /// Ordered fallback chain; index 0 is the primary provider.
    pub chain: Vec<ProviderConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            uses_monthly: false,
            temperature: 0.3,
            chain: Vec::new(),
        }
    }
}

/// One provider entry in a fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Model name as the provider's API expects it.
    pub name: String,
    /// Provider key used for credential lookup.
    pub provider: String,
    pub endpoint: String,
    pub max_tokens: u32,
    pub priority: u32,
}

impl ProviderConfig {
    fn new(name: &str, provider: &str, endpoint: &str, max_tokens: u32, priority: u32) -> Self {
        Self {
            name: name.to_string(),
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
            max_tokens,
            priority,
        }
    }
}

/// Where a provider's API key comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderCredential {
    pub api_key_env: String,
}

impl RegentConfig {
    /// Default credential env-var mapping for the reference providers.
    pub fn default_providers() -> BTreeMap<String, ProviderCredential> {
        let mut providers = BTreeMap::new();
        for (name, env) in [
            ("cerebras", "CEREBRAS_API_KEY"),
            ("sambanova", "SAMBANOVA_API_KEY"),
            ("groq", "GROQ_API_KEY"),
        ] {
            providers.insert(
                name.to_string(),
                ProviderCredential {
                    api_key_env: env.to_string(),
                },
            );
        }
        providers
    }

    /// Resolve provider API keys from the environment. Providers with no
    /// key set are simply absent from the map; a call through them fails
    /// like any other provider failure and triggers fallback.
    pub fn resolve_api_keys(&self) -> BTreeMap<String, String> {
        let providers = if self.providers.is_empty() {
            Self::default_providers()
        } else {
            self.providers.clone()
        };
        providers
            .iter()
            .filter_map(|(name, cred)| {
                std::env::var(&cred.api_key_env)
                    .ok()
                    .filter(|key| !key.is_empty())
                    .map(|key| (name.clone(), key))
            })
            .collect()
    }
}
