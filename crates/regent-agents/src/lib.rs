pub mod agent;
pub mod classify;
pub mod error;
pub mod forward_fill;
pub mod memory;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod provider;
pub mod router;

pub mod test_support;

pub use agent::{validate_result_shape, AgentKind, DomainAgent};
pub use classify::{classify, ErrorKind};
pub use error::AgentError;
pub use forward_fill::ForwardFillResolver;
pub use memory::MemoryManager;
pub use orchestrator::{Orchestrator, RunOptions, RunSummary};
pub use provider::{HttpProviderClient, ProviderClient, ProviderFailure};
pub use router::{ModelRouter, RouterReply, StickyState};
