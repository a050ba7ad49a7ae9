use std::sync::Arc;

use regent_models::{ProviderConfig, RouterConfig};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::{classify, ErrorKind};
use crate::error::AgentError;
use crate::provider::ProviderClient;

/// Mutable cursor over a fallback chain: which provider is currently
/// preferred and how many consecutive successes it has delivered.
/// Process state scoped to one router instance; resets to provider 0 at
/// instantiation and is never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyState {
    pub index: usize,
    pub success_count: u32,
}

#[derive(Debug, Clone)]
pub struct RouterReply {
    pub text: String,
    /// Model name of the provider that actually answered.
    pub model: String,
}

/// Sticky-with-fallback model router. Tries the currently preferred
/// provider first, then the rest of the chain in declared order;
/// stickiness follows success. After `retry_primary_after` consecutive
/// successes away from provider 0, the primary is re-probed.
pub struct ModelRouter {
    chain: Vec<ProviderConfig>,
    temperature: f64,
    policy: RouterConfig,
    client: Arc<dyn ProviderClient>,
    sticky: StickyState,
}

impl ModelRouter {
    pub fn new(
        chain: Vec<ProviderConfig>,
        temperature: f64,
        policy: &RouterConfig,
        client: Arc<dyn ProviderClient>,
    ) -> Self {
        Self {
            chain,
            temperature,
            policy: policy.clone(),
            client,
            sticky: StickyState::default(),
        }
    }

    pub fn sticky(&self) -> StickyState {
        self.sticky
    }

    /// Obtain one reply, failing only when the entire chain is exhausted.
    /// The classification of individual failures is advisory: every
    /// provider is always tried regardless of the classified kind.
    pub async fn invoke(&mut self, prompt: &str) -> Result<RouterReply, AgentError> {
        if self.chain.is_empty() {
            return Err(AgentError::ChainExhausted(ErrorKind::Other));
        }

        let request_id = Uuid::new_v4();

        if !self.policy.sticky_enabled {
            self.sticky = StickyState::default();
        } else if self.sticky.index != 0
            && self.sticky.success_count >= self.policy.retry_primary_after
        {
            info!(%request_id, "re-probing primary provider");
            self.sticky = StickyState::default();
        }

        let sticky_index = self.sticky.index.min(self.chain.len() - 1);
        let sticky_provider = &self.chain[sticky_index];
        let mut last_kind = ErrorKind::Other;

        match self
            .client
            .complete(sticky_provider, self.temperature, prompt)
            .await
        {
            Ok(text) => {
                self.sticky.success_count += 1;
                debug!(%request_id, model = %sticky_provider.name, "sticky provider succeeded");
                return Ok(RouterReply {
                    text,
                    model: sticky_provider.name.clone(),
                });
            }
            Err(failure) => {
                last_kind = classify(&failure.diagnostic);
                warn!(
                    %request_id,
                    model = %sticky_provider.name,
                    kind = %last_kind,
                    error = %failure,
                    "sticky provider failed, trying fallbacks"
                );
            }
        }

        for (index, provider) in self.chain.iter().enumerate() {
            if index == sticky_index {
                continue;
            }
            match self.client.complete(provider, self.temperature, prompt).await {
                Ok(text) => {
                    // Stickiness follows success.
                    self.sticky = StickyState {
                        index,
                        success_count: 1,
                    };
                    info!(%request_id, model = %provider.name, "switched sticky provider");
                    return Ok(RouterReply {
                        text,
                        model: provider.name.clone(),
                    });
                }
                Err(failure) => {
                    last_kind = classify(&failure.diagnostic);
                    warn!(
                        %request_id,
                        model = %provider.name,
                        kind = %last_kind,
                        error = %failure,
                        "fallback provider failed"
                    );
                }
            }
        }

        Err(AgentError::ChainExhausted(last_kind))
    }
}
