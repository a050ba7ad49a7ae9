use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use regent_models::ProviderConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// System line sent with every analysis call. Domain flavor lives in the
/// user prompt.
const SYSTEM_PROMPT: &str =
    "You are a financial analysis agent. Respond ONLY with valid JSON, no markdown fences, \
     no explanatory text.";

/// Raw failure from one provider call. The diagnostic text is whatever
/// the transport or the provider surfaced; it feeds `classify`.
#[derive(Debug)]
pub struct ProviderFailure {
    pub diagnostic: String,
}

impl ProviderFailure {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic)
    }
}

/// Transport seam for reasoning-service calls. The router state machine
/// only sees this trait, so it is testable without network access.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn complete(
        &self,
        provider: &ProviderConfig,
        temperature: f64,
        prompt: &str,
    ) -> Result<String, ProviderFailure>;
}

/// Production client speaking the OpenAI-style chat-completions contract
/// shared by the reference providers. Connection-pooled; one per process.
pub struct HttpProviderClient {
    client: reqwest::Client,
    api_keys: BTreeMap<String, String>,
    timeout: Duration,
}

impl HttpProviderClient {
    pub fn new(api_keys: BTreeMap<String, String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_keys,
            timeout,
        }
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn complete(
        &self,
        provider: &ProviderConfig,
        temperature: f64,
        prompt: &str,
    ) -> Result<String, ProviderFailure> {
        let api_key = self.api_keys.get(&provider.provider).ok_or_else(|| {
            ProviderFailure::new(format!("no API key configured for {}", provider.provider))
        })?;

        let body = ChatRequest {
            model: &provider.name,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature,
            max_tokens: provider.max_tokens,
        };

        debug!(model = %provider.name, provider = %provider.provider, "calling provider");

        let response = self
            .client
            .post(&provider.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderFailure::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderFailure::new(format!("HTTP {status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::new(format!("malformed provider response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderFailure::new("provider returned empty response"));
        }

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}
