pub mod config;
pub mod memory;
pub mod result;

pub use config::{
    AgentConfig, AgentsConfig, ForwardFillConfig, MemoryConfig, ProviderConfig,
    ProviderCredential, RegentConfig, RouterConfig, StoreConfig, ValidationConfig,
};
pub use memory::{
    LongContext, MediumContext, MemoryWindow, RecentContext, RecentDay, RegimeDay, WeekSummary,
};
pub use result::{
    AgentResult, Analysis, MemoryReferences, ResultMetadata, RunAgents, RunResult,
};
